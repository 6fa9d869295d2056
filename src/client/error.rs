use thiserror::Error;

use crate::models::ModelError;

/// Default messages when neither the service nor the transport explains a
/// failure.
pub const PREDICTION_FAILED: &str = "Prediction failed";
pub const UPLOAD_FAILED: &str = "Upload failed";
pub const ANALYSIS_FAILED: &str = "Analysis failed";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Prediction service is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Service returned error (status {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Service { status: u16, detail: Option<String> },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Malformed service response: {0}")]
    MalformedResponse(#[from] ModelError),

    #[error("Cannot read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// Network unreachable, timeout, or other transport-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Connection(_) | ClientError::Timeout(_) | ClientError::HttpClient(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// One human-readable line for display: the service's own message when
    /// it sent one, the transport description for transport failures, and
    /// `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Service {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            ClientError::Connection(_)
            | ClientError::Timeout(_)
            | ClientError::HttpClient(_)
            | ClientError::File { .. } => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Normalized terminal error of a submission workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    #[error("{message}")]
    Prediction { message: String },

    #[error("{message}")]
    Upload { message: String },

    #[error("{message}")]
    Analysis { message: String },
}

impl RequestFailure {
    pub fn prediction(err: &ClientError) -> Self {
        RequestFailure::Prediction {
            message: err.user_message(PREDICTION_FAILED),
        }
    }

    pub fn upload(err: &ClientError) -> Self {
        RequestFailure::Upload {
            message: err.user_message(UPLOAD_FAILED),
        }
    }

    pub fn analysis(err: &ClientError) -> Self {
        RequestFailure::Analysis {
            message: err.user_message(ANALYSIS_FAILED),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RequestFailure::Prediction { message }
            | RequestFailure::Upload { message }
            | RequestFailure::Analysis { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_detail_wins() {
        let err = ClientError::Service {
            status: 503,
            detail: Some("ML model not trained yet. Please train the model first.".into()),
        };
        assert_eq!(
            RequestFailure::prediction(&err).message(),
            "ML model not trained yet. Please train the model first."
        );
    }

    #[test]
    fn missing_detail_uses_operation_default() {
        let err = ClientError::Service {
            status: 500,
            detail: None,
        };
        assert_eq!(RequestFailure::prediction(&err).message(), "Prediction failed");
        assert_eq!(RequestFailure::upload(&err).message(), "Upload failed");
        assert_eq!(RequestFailure::analysis(&err).message(), "Analysis failed");
    }

    #[test]
    fn blank_detail_uses_default() {
        let err = ClientError::Service {
            status: 400,
            detail: Some("  ".into()),
        };
        assert_eq!(err.user_message(UPLOAD_FAILED), "Upload failed");
    }

    #[test]
    fn transport_errors_use_their_description() {
        let err = ClientError::Connection("http://localhost:8000".into());
        assert!(err.is_transport());
        assert_eq!(
            RequestFailure::upload(&err).message(),
            "Prediction service is not reachable at http://localhost:8000"
        );
        let err = ClientError::Timeout(120);
        assert_eq!(err.user_message(ANALYSIS_FAILED), "Request timed out after 120s");
    }

    #[test]
    fn parsing_errors_fall_back_to_default() {
        let err = ClientError::ResponseParsing("expected value at line 1".into());
        assert!(!err.is_transport());
        assert_eq!(err.user_message(PREDICTION_FAILED), "Prediction failed");
        let err = ClientError::from(ModelError::MalformedBatch("2 predictions for 3 rows".into()));
        assert_eq!(err.user_message(UPLOAD_FAILED), "Upload failed");
    }

    #[test]
    fn service_error_display_includes_status() {
        let err = ClientError::Service {
            status: 404,
            detail: Some("Patient not found".into()),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "Service returned error (status 404): Patient not found"
        );
    }
}
