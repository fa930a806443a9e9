pub mod auth;
pub mod health;
pub mod navigation;
pub mod wizard;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::middleware::security_headers;
use crate::session::{serialize_per_session, session_layer};
use crate::state::AppState;

pub fn build_router(state: AppState, secure_cookies: bool) -> Router {
    let sessions = session_layer(state.sessions.clone(), secure_cookies);
    let session_locks = state.session_locks.clone();

    Router::new()
        .route("/health", get(health::health_handler))
        // Session & navigation
        .route("/api/v1/session", get(navigation::handle_get_session))
        .route(
            "/api/v1/session/navigate",
            post(navigation::handle_navigate),
        )
        // Auth
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        // Wizard
        .route(
            "/api/v1/wizard/tech-options",
            get(wizard::handle_tech_options),
        )
        .route("/api/v1/wizard/step/:step", post(wizard::handle_jump))
        .route(
            "/api/v1/wizard/personal-details",
            post(wizard::handle_personal_details),
        )
        .route("/api/v1/wizard/tech-stack", post(wizard::handle_tech_stack))
        .route(
            "/api/v1/wizard/screening/ask",
            post(wizard::handle_screening_ask),
        )
        .route(
            "/api/v1/wizard/screening/continue",
            post(wizard::handle_screening_continue),
        )
        .route(
            "/api/v1/wizard/chatbot/documents",
            post(wizard::handle_store_document),
        )
        .route("/api/v1/wizard/chatbot/ask", post(wizard::handle_chatbot_ask))
        .with_state(state)
        .layer(sessions)
        // Outside the session layer, so a request keeps its turn until the
        // session record has been written.
        .layer(middleware::from_fn_with_state(
            session_locks,
            serialize_per_session,
        ))
        .layer(middleware::from_fn(security_headers))
}
