pub mod directory;
pub mod entity;
mod error;
pub mod postal;
pub mod service;
mod web;

use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};
use sigfinn::{ExitStatus, LifecycleManager, Shutdown};
use snafu::ResultExt;
use sqlx::{
    migrate::Migrator,
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::Instrument;

use self::postal::{
    Mailer, Strategies, TemplateResolver, UaaTokenLoader, UuidGenerator,
};
use self::service::{PgReceiptsRepo, PgTemplateStore};
pub use self::{
    error::{Error, Result},
    web::{controller, middleware::JwksClient, ApiDoc, ServiceState, TokenVerifier},
};
use herald_core::{
    config::{Config, MailConfig, PostgresConfig, UaaConfig},
    ServerInfo,
};

const MIGRATOR: Migrator = Migrator { ignore_missing: true, ..sqlx::migrate!() };

/// # Errors
/// Returns errors when server fails to start
pub async fn serve_with_shutdown(config: Config, server_info: ServerInfo) -> Result<()> {
    let Config { web, postgres, uaa, cloud_controller, smtp, mail } = config;

    let database = initialize_postgres_pool(&postgres).await?;

    let uaa_client = initialize_uaa_client(&uaa)?;

    let cloud_controller_client = Arc::new(
        directory::CloudControllerClient::new(&cloud_controller)
            .context(error::InitializeDirectoryClientSnafu)?,
    );

    let transport = initialize_mail_transport(&smtp)?;

    let token_verifier = TokenVerifier::from_config(&uaa).map_err(|err| {
        Error::InitializeTokenVerifier { message: err.to_string() }
    })?;

    let strategies = build_strategies(
        database.clone(),
        Arc::clone(&uaa_client),
        cloud_controller_client,
        transport,
        &mail,
    );

    let service_state = ServiceState::new(strategies, token_verifier);

    let lifecycle_manager = LifecycleManager::<Error>::new();

    let _handle = lifecycle_manager.spawn(
        "Http Server",
        create_web_http_server_future(web.listen_address, service_state, server_info),
    );

    if let Ok(Err(err)) = lifecycle_manager.serve().await {
        tracing::error!("{err}");
        Err(err)
    } else {
        Ok(())
    }
}

#[tracing::instrument(
    skip(password, database, ssl_mode, max_connections),
    fields(
        host = %host,
        port = port,
        username = %username
    )
)]
async fn initialize_postgres_pool(
    PostgresConfig {
        host,
        port,
        username,
        password,
        database,
        ssl_mode,
        max_connections,
        application_name,
    }: &PostgresConfig,
) -> Result<PgPool> {
    tracing::info!("Initializing database");

    let connect_opts = PgConnectOptions::new_without_pgpass()
        .host(host)
        .port(*port)
        .username(username)
        .password(password)
        .database(database)
        .ssl_mode(*ssl_mode);

    // append application name if provided
    let connect_opts = if let Some(app_name) = application_name {
        connect_opts.application_name(app_name)
    } else {
        connect_opts
    };

    let pool = PgPoolOptions::new()
        .max_connections(*max_connections)
        .connect_with(connect_opts)
        .await
        .context(error::InitializePostgresPoolSnafu {
            host: host.to_string(),
            port: *port,
            username: username.to_string(),
            database: database.to_string(),
        })?;

    MIGRATOR
        .run(&pool)
        .instrument(tracing::info_span!("migrate"))
        .await
        .context(error::MigrateSchemaSnafu)?;

    Ok(pool)
}

#[tracing::instrument(
    skip(uaa),
    fields(
        host = %uaa.host,
        client_id = %uaa.client_id
    )
)]
fn initialize_uaa_client(uaa: &UaaConfig) -> Result<Arc<directory::UaaClient>> {
    tracing::info!("Initializing UAA client");

    let client =
        directory::UaaClient::new(uaa).context(error::InitializeDirectoryClientSnafu)?;

    Ok(Arc::new(client))
}

#[tracing::instrument(
    skip(smtp),
    fields(
        host = %smtp.host,
        port = smtp.port
    )
)]
fn initialize_mail_transport(
    smtp: &herald_mail::smtp::Config,
) -> Result<Arc<herald_mail::smtp::Client>> {
    tracing::info!("Initializing SMTP transport");

    let client =
        herald_mail::smtp::Client::new(smtp).context(error::InitializeMailTransportSnafu)?;

    Ok(Arc::new(client))
}

fn build_strategies(
    database: PgPool,
    uaa_client: Arc<directory::UaaClient>,
    cloud_controller_client: Arc<directory::CloudControllerClient>,
    transport: Arc<herald_mail::smtp::Client>,
    mail: &MailConfig,
) -> Strategies {
    let mailer = Arc::new(Mailer::new(
        Arc::clone(&uaa_client) as _,
        transport as _,
        Arc::new(UuidGenerator),
        mail.sender.clone(),
        mail.delivery_concurrency,
    ));

    let deps = postal::strategies::StrategyDeps {
        token_loader: Arc::new(UaaTokenLoader::new(Arc::clone(&uaa_client))),
        users: uaa_client as _,
        orgs: cloud_controller_client as _,
        templates: TemplateResolver::new(Arc::new(PgTemplateStore::new(database.clone()))),
        mailer,
        receipts: Arc::new(PgReceiptsRepo::new(database)),
    };

    Strategies::new(&deps)
}

fn create_web_http_server_future(
    listen_address: std::net::SocketAddr,
    service_state: ServiceState,
    server_info: ServerInfo,
) -> impl FnOnce(Shutdown) -> BoxFuture<'static, ExitStatus<Error>> {
    move |shutdown_signal| {
        async move {
            tracing::info!("Listen Web HTTP server endpoint on {listen_address}");

            let result =
                web::new_api_server(listen_address, service_state, server_info, shutdown_signal)
                    .await;

            match result {
                Ok(()) => {
                    tracing::info!("HTTP server is shut down gracefully");
                    ExitStatus::Success
                }
                Err(err) => ExitStatus::FatalError(Error::from(err)),
            }
        }
        .boxed()
    }
}
