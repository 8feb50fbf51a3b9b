//! Browser-facing routes. Page data is served as JSON; the gate has already
//! redirected callers that may not see a page.

use crate::{
    api::{
        SharedState,
        gate::LOGIN_PATH,
        models::{ApiError, Envelope},
    },
    auth::guard::Session,
    core::{
        errors::FreewiseError,
        models::group::{GroupDetail, UserWithGroups},
        services::AdminOverview,
    },
};
use axum::{
    Router,
    extract::{Path, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::info;

pub fn page_routes() -> Router<SharedState> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/", get(|| async { Redirect::to("/user") }))
        .route("/login", get(|| async { "Log in with POST /api/login" }))
        .route("/register", get(|| async { "Register with POST /api/register" }))
        .route("/forbidden", get(|| async { "You do not have access to this page" }))
        .route("/logout", get(logout_page))
        .route("/user", get(user_page))
        .route("/group/{group_id}", get(group_page))
        .route("/admin", get(admin_page))
        .route("/invite/{group_id}", get(invite_page))
}

async fn user_page(State(state): State<SharedState>, session: Session) -> Result<Envelope<UserWithGroups>, ApiError> {
    Ok(Envelope::ok(state.service.get_user_with_groups(&session).await?))
}

async fn group_page(
    State(state): State<SharedState>,
    session: Session,
    Path(group_id): Path<String>,
) -> Result<Envelope<GroupDetail>, ApiError> {
    Ok(Envelope::ok(state.service.get_group(&session, &group_id).await?))
}

async fn admin_page(State(state): State<SharedState>, session: Session) -> Result<Envelope<AdminOverview>, ApiError> {
    Ok(Envelope::ok(state.service.admin_overview(&session).await?))
}

/// Invite link: joins the group and lands on its page. Existing members are
/// sent straight to the page.
async fn invite_page(
    State(state): State<SharedState>,
    session: Session,
    Path(group_id): Path<String>,
) -> Result<Redirect, ApiError> {
    if session.verify().is_err() {
        return Ok(Redirect::to(LOGIN_PATH));
    }
    match state.service.join_group(&session, &group_id).await {
        Ok(_) | Err(FreewiseError::AlreadyMember(_)) => Ok(Redirect::to(&format!("/group/{}", group_id))),
        Err(e) => Err(e.into()),
    }
}

async fn logout_page(State(state): State<SharedState>, session: Session) -> Result<Response, ApiError> {
    let cookie = state
        .cookie
        .destroy()
        .map_err(|e| FreewiseError::InternalServerError(format!("cookie header: {}", e)))?;
    if let Ok(payload) = session.verify() {
        info!(user_id = %payload.id, "user logged out");
    }
    Ok(([(SET_COOKIE, cookie)], Redirect::to(LOGIN_PATH)).into_response())
}
