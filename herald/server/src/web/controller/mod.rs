mod error;
pub mod notify;

use axum::{middleware, routing, Extension, Router};
use utoipa::OpenApi;

pub use self::error::{Error, Result};
use crate::{web::middleware::jwt_auth_middleware, ServiceState};
use herald_core::ServerInfo;

pub fn api_router(service_state: &ServiceState) -> Router {
    // Every dispatch route sits behind bearer authentication; scope checks
    // happen inside the shared execute path.
    let dispatch_routes = Router::new()
        .route("/users/:guid", routing::post(notify::user))
        .route("/spaces/:guid", routing::post(notify::space))
        .route("/organizations/:guid", routing::post(notify::organization))
        .route("/everyone", routing::post(notify::everyone))
        .route("/uaa_scopes/:scope", routing::post(notify::uaa_scope))
        .layer(middleware::from_fn_with_state(
            service_state.token_verifier.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .merge(dispatch_routes)
        .route("/info", routing::get(server_info))
        .with_state(service_state.clone())
}

/// Get server info
#[utoipa::path(
    get,
    operation_id = "get_server_info",
    path = "/info",
    responses(
        (status = 200, body = ServerInfo)
    )
)]
pub async fn server_info(Extension(server_info): Extension<ServerInfo>) -> axum::Json<ServerInfo> {
    axum::Json(server_info)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        server_info,
        notify::user,
        notify::space,
        notify::organization,
        notify::everyone,
        notify::uaa_scope,
    ),
    components(schemas(
        herald_core::ServerInfo,
        herald_core::model::OrgRole,
        crate::entity::NotifyRequest,
        crate::entity::NotifyResponse,
        crate::postal::DeliveryStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Notify", description = "Notification dispatch endpoints")
    )
)]
pub struct ApiDoc;

/// Security scheme for JWT bearer authentication
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
