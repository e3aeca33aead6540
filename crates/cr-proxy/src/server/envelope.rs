use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cr_api::models::ParseError;
use serde::Serialize;
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            extra: Map::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug)]
pub(crate) struct ProxyError {
    pub status: StatusCode,
    pub message: String,
}

impl ProxyError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// Upstream refusals keep their message and become a 400. Anything else
    /// is logged and reported as a generic 500.
    pub fn upstream(err: cr_api::Error, what: &str) -> Self {
        if err.is_upstream_rejection() {
            Self::bad_request(err.to_string())
        } else {
            tracing::error!(error = %err, "Unexpected failure fetching {what}");
            Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("An unexpected error occurred while fetching {what}"),
            }
        }
    }
}

impl From<ParseError> for ProxyError {
    fn from(err: ParseError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            success: false,
            data: None,
            error: Some(self.message),
            message: None,
            extra: Map::new(),
        };
        (self.status, Json(body)).into_response()
    }
}

pub(crate) type ProxyResult<T> = Result<Envelope<T>, ProxyError>;
