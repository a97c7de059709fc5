//! Candidate validation and reload orchestration.

use std::sync::Arc;

use crate::proxy::{ProxyError, ProxyProcess};

/// Applies candidate configurations to the live proxy.
///
/// Keeps the last configuration that passed the syntax check so a
/// rejected candidate can be rolled back on disk.
pub struct ProxyController {
    process: Arc<dyn ProxyProcess>,
    last_good: Option<String>,
}

impl ProxyController {
    pub fn new(process: Arc<dyn ProxyProcess>) -> Self {
        Self {
            process,
            last_good: None,
        }
    }

    /// Write `candidate` and run the proxy's syntax check. On rejection
    /// the last known-good configuration is rewritten before the error is
    /// returned, so the live proxy never reloads an invalid config.
    pub async fn apply(&mut self, candidate: &str) -> Result<(), ProxyError> {
        self.process.write_config(candidate).await?;
        match self.process.check_syntax().await {
            Ok(()) => {
                self.last_good = Some(candidate.to_string());
                Ok(())
            }
            Err(err) => {
                if let Some(previous) = &self.last_good {
                    if let Err(rewrite_err) = self.process.write_config(previous).await {
                        tracing::error!(
                            error = %rewrite_err,
                            "failed to restore last known-good configuration"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    /// Signal a graceful reload. Failures are surfaced without retrying;
    /// the applied configuration stays in place.
    pub async fn reload(&self) -> Result<(), ProxyError> {
        self.process.signal_reload().await
    }

    pub fn last_good(&self) -> Option<&str> {
        self.last_good.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProcess {
        written: Mutex<Vec<String>>,
        reject_syntax: AtomicBool,
        reloads: AtomicUsize,
    }

    #[async_trait]
    impl ProxyProcess for FakeProcess {
        async fn write_config(&self, config: &str) -> Result<(), ProxyError> {
            self.written.lock().unwrap().push(config.to_string());
            Ok(())
        }

        async fn check_syntax(&self) -> Result<(), ProxyError> {
            if self.reject_syntax.load(Ordering::SeqCst) {
                Err(ProxyError::InvalidConfig("bad config".to_string()))
            } else {
                Ok(())
            }
        }

        async fn signal_reload(&self) -> Result<(), ProxyError> {
            self.reloads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_apply_tracks_last_good() {
        let process = Arc::new(FakeProcess::default());
        let mut controller = ProxyController::new(process.clone());

        controller.apply("config v1").await.unwrap();
        assert_eq!(controller.last_good(), Some("config v1"));
    }

    #[tokio::test]
    async fn test_rejected_candidate_rewrites_last_good() {
        let process = Arc::new(FakeProcess::default());
        let mut controller = ProxyController::new(process.clone());
        controller.apply("config v1").await.unwrap();

        process.reject_syntax.store(true, Ordering::SeqCst);
        let err = controller.apply("config v2").await.unwrap_err();
        assert!(matches!(err, ProxyError::InvalidConfig(_)));
        assert_eq!(controller.last_good(), Some("config v1"));

        // The bad candidate was written, then the last-good restored.
        let written = process.written.lock().unwrap();
        assert_eq!(
            written.as_slice(),
            ["config v1", "config v2", "config v1"]
        );
    }

    #[tokio::test]
    async fn test_reload_delegates_to_process() {
        let process = Arc::new(FakeProcess::default());
        let controller = ProxyController::new(process.clone());
        controller.reload().await.unwrap();
        assert_eq!(process.reloads.load(Ordering::SeqCst), 1);
    }
}
