use std::fmt::Debug;

use axum::{
    body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Error envelope returned for every non-2xx response.
///
/// The HTTP status code is mirrored into the body as `_status` so clients
/// reading the payload off a log or a proxy capture can still classify it.
#[derive(Debug, Deserialize, Serialize)]
pub struct EncapsulatedJsonError<E> {
    #[serde(rename = "_status", with = "http_serde::status_code")]
    status_code: StatusCode,

    error: Option<E>,
}

impl<E> EncapsulatedJsonError<E> {
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn err(error: E) -> Self {
        Self { status_code: StatusCode::INTERNAL_SERVER_ERROR, error: Some(error) }
    }

    #[inline]
    #[must_use]
    pub const fn status_code(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn error(self) -> Option<E> { self.error }
}

impl<E> From<(StatusCode, E)> for EncapsulatedJsonError<E> {
    #[inline]
    fn from((status_code, error): (StatusCode, E)) -> Self {
        Self { status_code, error: Some(error) }
    }
}

impl<E> IntoResponse for EncapsulatedJsonError<E>
where
    E: Debug + Serialize,
{
    fn into_response(self) -> Response {
        let body = body::Body::from(serde_json::to_vec(&self).expect("self is serializable"));

        Response::builder()
            .status(self.status_code)
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(body)
            .expect("Build `Axum` response successfully; qed")
    }
}

/// Body of the error envelope.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Error {
    #[serde(rename = "type")]
    pub type_: ErrorType,

    pub message: String,

    /// One human-readable entry per offending field for validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    #[serde(flatten, skip_serializing_if = "IndexMap::is_empty")]
    pub additional_fields: IndexMap<String, serde_json::Value>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    Unknown,
    Internal,
    Validation,
    Parse,
    NotFound,
    Unauthorized,
    Forbidden,
    BadRequest,
    BadGateway,
}

#[macro_export]
macro_rules! json_response {
    (status: $status:expr,error: $error:expr) => {
        EncapsulatedJsonError::<_>::err($error).status_code($status).into_response()
    };

    (reason: $reason:expr,status: $status:expr,error: $error:expr) => {{
        if $status.is_server_error() {
            tracing::error!(status_code = $status.as_u16(), "Server Error: {:?}", $reason);
        } else {
            tracing::warn!(status_code = $status.as_u16(), "Response Error: {:?}", $reason);
        }

        json_response! { status: $status, error: $error }
    }};
}
