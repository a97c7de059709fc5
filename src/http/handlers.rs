//! Control API request handlers.

use axum::extract::{Query, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::actions::ActionError;
use crate::distribute::PeerRequest;
use crate::http::params::{ReconfigureParams, RemoveParams};
use crate::http::server::AppState;
use crate::model::ServiceSpec;

/// Echoed back on a successful reconfigure, mirroring the accepted
/// descriptor so callers can confirm what was applied.
#[derive(Debug, Serialize)]
struct ReconfigureResponse {
    status: &'static str,
    #[serde(flatten)]
    spec: ServiceSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveResponse {
    status: &'static str,
    service_name: String,
}

fn action_error_response(err: &ActionError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string()).into_response()
}

pub async fn reconfigure(
    State(state): State<AppState>,
    Query(params): Query<ReconfigureParams>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let mut spec = params.into_spec(&state.mode);
    if let Err(err) = spec.validate() {
        return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
    }

    if !spec.service_cert.is_empty() {
        let result = state
            .certs
            .put_cert(spec.cert_name(), spec.decoded_cert().as_bytes())
            .await;
        if let Err(err) = result {
            tracing::error!(error = %err, "certificate write failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to store certificate".to_string(),
            )
                .into_response();
        }
        // Never echo certificate material back to the caller.
        spec.service_cert.clear();
    }

    if spec.distribute {
        let request = PeerRequest::new(
            "/v1/flow-proxy/reconfigure",
            raw_query.as_deref().unwrap_or(""),
        );
        if let Err(err) = state.distributor.distribute(&request).await {
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    } else if let Err(err) = state.reconfigure.execute(&spec).await {
        return action_error_response(&err);
    }

    spec.distribute = false;
    Json(ReconfigureResponse {
        status: "OK",
        spec,
    })
    .into_response()
}

pub async fn remove(
    State(state): State<AppState>,
    Query(params): Query<RemoveParams>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let distribute = params.distribute;
    let spec = params.into_spec(
        &state.templates_path,
        &state.configs_path,
        &state.base.consul_addresses,
        &state.base.instance_name,
        &state.mode,
    );
    if spec.service_name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "serviceName is required".to_string(),
        )
            .into_response();
    }

    if distribute {
        let request =
            PeerRequest::new("/v1/flow-proxy/remove", raw_query.as_deref().unwrap_or(""));
        if let Err(err) = state.distributor.distribute(&request).await {
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    } else if let Err(err) = state.remove.execute(&spec).await {
        return action_error_response(&err);
    }

    Json(RemoveResponse {
        status: "OK",
        service_name: spec.service_name,
    })
    .into_response()
}

/// Current rendered proxy configuration, for operator inspection.
pub async fn config(State(state): State<AppState>) -> Response {
    let rendered = state.state.lock().await.store.render();
    (
        [(header::CONTENT_TYPE, "text/html")],
        rendered,
    )
        .into_response()
}

/// Liveness probe, answered without touching any state.
pub async fn test() -> StatusCode {
    StatusCode::OK
}
