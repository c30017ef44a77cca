//! The five dispatch endpoints. They share one execution path; only the
//! strategy picked from the registry differs.

use std::sync::Arc;

use axum::{body::Bytes, extract::Path, extract::State, Json};

use crate::{
    entity::{trim_deliveries, NotifyRequest, NotifyResponse},
    postal::Strategy,
    web::{
        controller::{error, Error, Result},
        extractor::AuthClient as AuthClientExtractor,
        middleware::AuthClient,
    },
    ServiceState,
};

/// Scope every dispatch caller must hold.
pub const NOTIFICATIONS_WRITE_SCOPE: &str = "notifications.write";

/// Additional scope required to send critical notifications.
pub const CRITICAL_NOTIFICATIONS_WRITE_SCOPE: &str = "critical_notifications.write";

/// Notify a single user
///
/// Dispatches one message to the user named by the path guid.
#[utoipa::path(
    post,
    operation_id = "notify_user",
    path = "/users/{guid}",
    request_body = NotifyRequest,
    responses(
        (status = 200, description = "Per-recipient delivery report", body = [NotifyResponse]),
        (status = 400, description = "Malformed JSON body"),
        (status = 403, description = "Missing a required scope"),
        (status = 422, description = "Missing required fields")
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn user(
    State(state): State<ServiceState>,
    AuthClientExtractor(auth): AuthClientExtractor,
    Path(guid): Path<String>,
    body: Bytes,
) -> Result<Json<Vec<NotifyResponse>>> {
    execute(&auth, Arc::clone(&state.strategies.user), &guid, &body).await
}

/// Notify every user in a space
#[utoipa::path(
    post,
    operation_id = "notify_space",
    path = "/spaces/{guid}",
    request_body = NotifyRequest,
    responses(
        (status = 200, description = "Per-recipient delivery report", body = [NotifyResponse])
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn space(
    State(state): State<ServiceState>,
    AuthClientExtractor(auth): AuthClientExtractor,
    Path(guid): Path<String>,
    body: Bytes,
) -> Result<Json<Vec<NotifyResponse>>> {
    execute(&auth, Arc::clone(&state.strategies.space), &guid, &body).await
}

/// Notify members of an organization
///
/// The optional `role` body field narrows the audience to members holding
/// that organization role.
#[utoipa::path(
    post,
    operation_id = "notify_organization",
    path = "/organizations/{guid}",
    request_body = NotifyRequest,
    responses(
        (status = 200, description = "Per-recipient delivery report", body = [NotifyResponse]),
        (status = 422, description = "Unrecognized organization role")
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn organization(
    State(state): State<ServiceState>,
    AuthClientExtractor(auth): AuthClientExtractor,
    Path(guid): Path<String>,
    body: Bytes,
) -> Result<Json<Vec<NotifyResponse>>> {
    execute(&auth, Arc::clone(&state.strategies.organization), &guid, &body).await
}

/// Notify every user in the system
#[utoipa::path(
    post,
    operation_id = "notify_everyone",
    path = "/everyone",
    request_body = NotifyRequest,
    responses(
        (status = 200, description = "Per-recipient delivery report", body = [NotifyResponse])
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn everyone(
    State(state): State<ServiceState>,
    AuthClientExtractor(auth): AuthClientExtractor,
    body: Bytes,
) -> Result<Json<Vec<NotifyResponse>>> {
    execute(&auth, Arc::clone(&state.strategies.everyone), "", &body).await
}

/// Notify every user holding an authorization scope
#[utoipa::path(
    post,
    operation_id = "notify_uaa_scope",
    path = "/uaa_scopes/{scope}",
    request_body = NotifyRequest,
    responses(
        (status = 200, description = "Per-recipient delivery report", body = [NotifyResponse])
    ),
    security(("bearer_auth" = [])),
    tag = "Notify"
)]
pub async fn uaa_scope(
    State(state): State<ServiceState>,
    AuthClientExtractor(auth): AuthClientExtractor,
    Path(scope): Path<String>,
    body: Bytes,
) -> Result<Json<Vec<NotifyResponse>>> {
    execute(&auth, Arc::clone(&state.strategies.uaa_scope), &scope, &body).await
}

/// The shared dispatch path: authorize, parse, validate, guard criticals,
/// hand off to the strategy, trim the result.
async fn execute(
    auth: &AuthClient,
    strategy: Arc<dyn Strategy>,
    target_id: &str,
    body: &[u8],
) -> Result<Json<Vec<NotifyResponse>>> {
    if !auth.has_scope(NOTIFICATIONS_WRITE_SCOPE) {
        return Err(Error::MissingScope { scope: NOTIFICATIONS_WRITE_SCOPE.to_string() });
    }

    let request =
        NotifyRequest::parse(body).map_err(|source| Error::ParseRequestBody { source })?;

    let errors = request.missing_field_errors();
    if !errors.is_empty() {
        return Err(error::ValidationSnafu { errors }.build());
    }

    let options = request.into_options()?;

    if options.critical && !auth.has_scope(CRITICAL_NOTIFICATIONS_WRITE_SCOPE) {
        return Err(Error::CriticalNotificationForbidden { kind_id: options.kind_id });
    }

    let deliveries = strategy.dispatch(&auth.client_id, target_id, options).await?;

    Ok(Json(trim_deliveries(deliveries)))
}
