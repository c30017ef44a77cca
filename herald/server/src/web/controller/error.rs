use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use indexmap::IndexMap;
use snafu::Snafu;

use crate::postal::DispatchError;
use herald_axum::{json_response, response, response::EncapsulatedJsonError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Model { source: herald_core::error::Error },

    #[snafu(display("Failed to parse the request body as JSON"))]
    ParseRequestBody { source: serde_json::Error },

    #[snafu(display("The request body is missing required fields"))]
    Validation { errors: Vec<String> },

    #[snafu(display("The token lacks the `{scope}` scope"))]
    MissingScope { scope: String },

    #[snafu(display(
        "Sending a critical notification of kind `{kind_id}` requires the \
         `critical_notifications.write` scope"
    ))]
    CriticalNotificationForbidden { kind_id: String },

    #[snafu(display("{source}"))]
    Dispatch { source: DispatchError },
}

impl From<herald_core::error::Error> for Error {
    fn from(source: herald_core::error::Error) -> Self { Self::Model { source } }
}

impl From<DispatchError> for Error {
    fn from(source: DispatchError) -> Self { Self::Dispatch { source } }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::Model { source } => source.into_response(),
            Self::ParseRequestBody { .. } => json_response! {
                reason: self,
                status: StatusCode::BAD_REQUEST,
                error: response::Error {
                    type_: response::ErrorType::Parse,
                    message: self.to_string(),
                    errors: Vec::new(),
                    additional_fields: IndexMap::default(),
                }
            },
            Self::Validation { ref errors } => {
                let errors = errors.clone();
                json_response! {
                    reason: self,
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    error: response::Error {
                        type_: response::ErrorType::Validation,
                        message: self.to_string(),
                        errors,
                        additional_fields: IndexMap::default(),
                    }
                }
            }
            Self::MissingScope { .. } | Self::CriticalNotificationForbidden { .. } => {
                json_response! {
                    reason: self,
                    status: StatusCode::FORBIDDEN,
                    error: response::Error {
                        type_: response::ErrorType::Forbidden,
                        message: self.to_string(),
                        errors: Vec::new(),
                        additional_fields: IndexMap::default(),
                    }
                }
            }
            Self::Dispatch { ref source } => {
                let (status, type_) = match source {
                    DispatchError::LoadToken { .. } | DispatchError::ResolveRecipients { .. } => {
                        (StatusCode::BAD_GATEWAY, response::ErrorType::BadGateway)
                    }
                    DispatchError::LoadTemplates { .. }
                    | DispatchError::RecordReceipts { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, response::ErrorType::Internal)
                    }
                };
                let message = self.to_string();
                json_response! {
                    reason: self,
                    status: status,
                    error: response::Error {
                        type_,
                        message,
                        errors: Vec::new(),
                        additional_fields: IndexMap::default(),
                    }
                }
            }
        }
    }
}
