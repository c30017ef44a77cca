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
    #[snafu(display("Fail to look up template, error: {source}"))]
    FindTemplate { source: sqlx::Error },

    #[snafu(display("Fail to record delivery receipts, error: {source}"))]
    CreateReceipts { source: sqlx::Error },
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        json_response! {
            reason: self,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: response::Error {
                type_: response::ErrorType::Internal,
                message: self.to_string(),
                errors: Vec::new(),
                additional_fields: IndexMap::default(),
            }
        }
    }
}
