use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use indexmap::IndexMap;
use snafu::Snafu;

use herald_axum::{json_response, response, response::EncapsulatedJsonError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Invalid organization role provided
    #[snafu(display("Invalid organization role: {role}"))]
    InvalidOrgRole { role: String },
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidOrgRole { .. } => json_response! {
                reason: self,
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: response::Error {
                    type_: response::ErrorType::Validation,
                    message: self.to_string(),
                    errors: vec![self.to_string()],
                    additional_fields: IndexMap::default(),
                }
            },
        }
    }
}
