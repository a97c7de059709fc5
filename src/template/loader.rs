//! Filesystem access for custom template overrides.

use std::path::Path;

use async_trait::async_trait;

use crate::template::TemplateError;

/// Capability to read a custom template file.
#[async_trait]
pub trait TemplateFileLoader: Send + Sync {
    async fn read_template(&self, path: &Path) -> Result<String, TemplateError>;
}

/// Loader backed by the real filesystem.
pub struct FsTemplateLoader;

#[async_trait]
impl TemplateFileLoader for FsTemplateLoader {
    async fn read_template(&self, path: &Path) -> Result<String, TemplateError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TemplateError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_loader_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fe.tmpl");
        std::fs::write(&path, "acl url_{{SERVICE_NAME}} path_beg /x").unwrap();

        let content = FsTemplateLoader.read_template(&path).await.unwrap();
        assert!(content.contains("{{SERVICE_NAME}}"));
    }

    #[tokio::test]
    async fn test_fs_loader_reports_missing_file() {
        let err = FsTemplateLoader
            .read_template(Path::new("/no/such/template.tmpl"))
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
    }
}
