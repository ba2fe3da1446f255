use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonblob_registry::RegistryError;
use jsonblob_store::StoreError;
use serde::{Deserialize, Serialize};

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `NOT_FOUND`.
    pub code: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unknown API group: {0}")]
    UnknownGroup(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Registry(err) => match err {
                RegistryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                RegistryError::AlreadyExists { .. } => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
                RegistryError::NamespaceRequired { .. }
                | RegistryError::NamespaceNotAllowed { .. } => {
                    (StatusCode::BAD_REQUEST, "BAD_NAMESPACE")
                }
                RegistryError::Invalid { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID"),
                RegistryError::BackendUnavailable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNAVAILABLE")
                }
                RegistryError::CorruptState { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "CORRUPT_STATE")
                }
                RegistryError::OverflowDropped { .. } | RegistryError::Watch(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            Self::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNAVAILABLE"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::UnknownGroup(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            match status {
                StatusCode::SERVICE_UNAVAILABLE => "The object store is unavailable".to_string(),
                _ => "An internal error occurred".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: ServerError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn registry_errors_map_to_statuses() {
        let not_found = RegistryError::NotFound {
            resource: "machines.cloud.jsonblob.dev".into(),
            key: "m1".into(),
        };
        assert_eq!(status(not_found.into()), StatusCode::NOT_FOUND);

        let conflict = RegistryError::AlreadyExists {
            resource: "machines.cloud.jsonblob.dev".into(),
            key: "m1".into(),
        };
        assert_eq!(status(conflict.into()), StatusCode::CONFLICT);

        let ns = RegistryError::NamespaceRequired {
            resource: "nodes.infra".into(),
        };
        assert_eq!(status(ns.into()), StatusCode::BAD_REQUEST);

        let invalid = RegistryError::Invalid {
            reason: "bad name".into(),
        };
        assert_eq!(status(invalid.into()), StatusCode::UNPROCESSABLE_ENTITY);

        let corrupt = RegistryError::CorruptState {
            path: "a.json".into(),
            reason: "eof".into(),
        };
        assert_eq!(status(corrupt.into()), StatusCode::INTERNAL_SERVER_ERROR);

        let down = RegistryError::BackendUnavailable {
            op: "get",
            path: "a.json".into(),
            source: StoreError::Backend("timeout".into()),
        };
        assert_eq!(status(down.into()), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err: ServerError = RegistryError::NotFound {
            resource: "machines.cloud.jsonblob.dev".into(),
            key: "m1".into(),
        }
        .into();
        assert_eq!(err.to_string(), "machines.cloud.jsonblob.dev \"m1\" not found");
    }
}
