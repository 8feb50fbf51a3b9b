pub mod gate;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod pages;

use crate::{
    auth::{
        cookie::SessionCookie,
        guard::{Session, verify_session},
        jwt::SessionCodec,
        password::PasswordHasher,
    },
    config::Config,
    core::services::FreewiseService,
    infrastructure::{
        currency::{CurrencyClient, CurrencyError},
        storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Router,
    extract::FromRequestParts,
    http::{self, header, request::Parts},
    middleware,
};
use std::{convert::Infallible, sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub struct AppState {
    pub service: FreewiseService<InMemoryStorage>,
    pub cookie: SessionCookie,
    pub currency: CurrencyClient,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, CurrencyError> {
        let codec = SessionCodec::new(config.jwt_secret.as_bytes(), config.session_ttl);
        let service = FreewiseService::new(
            InMemoryStorage::new(),
            codec,
            PasswordHasher::new(config.bcrypt_cost),
            config.default_currency.clone(),
        );
        let cookie =
            SessionCookie::new(config.cookie_name.clone(), config.cookie_secure).with_same_site(config.cookie_same_site);
        Ok(AppState {
            service,
            cookie,
            currency: CurrencyClient::new(config.exchange_rates_url.clone())?,
        })
    }
}

/// Handlers receive the memoized session check; rejection is left to the service.
impl FromRequestParts<SharedState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        Ok(verify_session(parts, &state.cookie, state.service.codec()))
    }
}

/// Full application: pages, JSON API, docs and the request gate.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .nest("/api", handlers::api_routes())
        .merge(pages::page_routes())
        .layer(middleware::from_fn_with_state(state.clone(), gate::request_gate))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT, http::Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
}
