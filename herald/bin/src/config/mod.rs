mod cloud_controller;
mod error;
mod mail;
mod postgres;
mod smtp;
mod uaa;
mod web;

use std::path::{Path, PathBuf};

use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use herald_cli_common::config::LogConfig;

pub use self::{
    cloud_controller::CloudControllerConfig, error::Error, mail::MailConfig,
    postgres::PostgresConfig, smtp::SmtpConfig, uaa::{TokenVerification, UaaConfig},
    web::WebConfig,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub postgres: PostgresConfig,

    #[serde(default)]
    pub uaa: UaaConfig,

    #[serde(default)]
    pub cloud_controller: CloudControllerConfig,

    #[serde(default)]
    pub smtp: SmtpConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            web: WebConfig::default(),
            postgres: PostgresConfig::default(),
            uaa: UaaConfig::default(),
            cloud_controller: CloudControllerConfig::default(),
            smtp: SmtpConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Config {
    #[inline]
    pub fn default_path() -> PathBuf {
        [
            herald_core::PROJECT_CONFIG_DIR.to_path_buf(),
            PathBuf::from(herald_core::CONFIG_NAME),
        ]
        .into_iter()
        .collect()
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut config: Self = {
            let data = std::fs::read_to_string(&path)
                .context(error::OpenConfigSnafu { filename: path.as_ref().to_path_buf() })?;

            serde_yaml::from_str(&data)
                .context(error::ParseConfigSnafu { filename: path.as_ref().to_path_buf() })?
        };

        config.log.file_path = match config.log.file_path.map(|path| {
            path.try_resolve()
                .map(|path| path.to_path_buf())
                .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
        }) {
            Some(Ok(path)) => Some(path),
            Some(Err(err)) => return Err(err),
            None => None,
        };

        Ok(config)
    }
}

#[inline]
pub fn load_server_config(
    Config { web, postgres, uaa, cloud_controller, smtp, mail, .. }: Config,
) -> Result<herald_core::config::Config, Error> {
    Ok(herald_core::config::Config {
        web: web.into(),
        postgres: postgres.into(),
        uaa: uaa.into(),
        cloud_controller: cloud_controller.into(),
        smtp: smtp.into(),
        mail: mail.into(),
    })
}
