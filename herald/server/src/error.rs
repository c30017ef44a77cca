use std::borrow::Cow;

use snafu::Snafu;

use crate::{directory, web};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display(
        "Can not initialize Postgres pool with endpoint \
         `postgres://{username}@{host}:{port}/{database}`, error: {source}"
    ))]
    InitializePostgresPool {
        host: Cow<'static, str>,
        port: u16,
        username: Cow<'static, str>,
        database: Cow<'static, str>,
        source: sqlx::error::Error,
    },

    #[snafu(display("Fail to migrate postgres schema, error: {source}"))]
    MigrateSchema { source: sqlx::migrate::MigrateError },

    #[snafu(display("Failed to initialize directory client, error: {source}"))]
    InitializeDirectoryClient { source: directory::Error },

    #[snafu(display("Failed to initialize mail transport, error: {source}"))]
    InitializeMailTransport { source: herald_mail::Error },

    #[snafu(display("Failed to initialize token verifier: {message}"))]
    InitializeTokenVerifier { message: String },

    #[snafu(display("{source}"))]
    Web { source: web::Error },
}

impl From<web::Error> for Error {
    fn from(source: web::Error) -> Self { Self::Web { source } }
}
