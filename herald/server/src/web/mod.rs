pub mod controller;
pub mod error;
pub mod extractor;
pub mod middleware;

use std::{future::Future, net::SocketAddr};

use axum::{
    extract::Request, http, response::IntoResponse, routing, Extension, Json, Router, ServiceExt,
};
use snafu::ResultExt;
use tokio::net::TcpListener;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer, normalize_path::NormalizePathLayer, trace::TraceLayer,
};
use utoipa::OpenApi;

pub use self::{controller::ApiDoc, error::Error, middleware::TokenVerifier};
use crate::postal::Strategies;
use herald_axum::{json_response, response::EncapsulatedJsonError};
use herald_core::ServerInfo;

pub async fn new_api_server<ShutdownSignal>(
    socket_address: SocketAddr,
    service_state: ServiceState,
    server_info: ServerInfo,
    shutdown_signal: ShutdownSignal,
) -> Result<(), Error>
where
    ShutdownSignal: Future<Output = ()> + Send + 'static,
{
    let middleware_stack =
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CompressionLayer::new());

    let router = {
        let router = Router::new()
            // For load balancer default health checks
            .route("/", routing::get(controller::server_info))
            .route("/openapi.json", routing::get(openapi_json))
            .merge(controller::api_router(&service_state))
            .layer(Extension(server_info))
            .layer(middleware_stack)
            .fallback(fallback);
        let router = NormalizePathLayer::trim_trailing_slash().layer(router);
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(router)
    };

    let listener = TcpListener::bind(&socket_address).await.context(error::BindTcpServerSnafu)?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|err| Error::ServeHttpServer { message: err.to_string() })
}

// SAFETY: `axum` handler must be async
#[allow(clippy::unused_async)]
async fn fallback(uri: http::Uri) -> axum::response::Response {
    json_response! {
        status: http::StatusCode::NOT_FOUND,
        error: herald_axum::response::Error {
            type_: herald_axum::response::ErrorType::NotFound,
            message: format!("No route for {uri}"),
            errors: Vec::new(),
            additional_fields: indexmap::IndexMap::default(),
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> { Json(ApiDoc::openapi()) }

/// Everything the dispatch handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct ServiceState {
    pub strategies: Strategies,
    pub token_verifier: TokenVerifier,
}

impl ServiceState {
    #[must_use]
    pub fn new(strategies: Strategies, token_verifier: TokenVerifier) -> Self {
        Self { strategies, token_verifier }
    }
}
