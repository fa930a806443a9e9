use axum::{extract::State, Json};
use serde::Deserialize;

use crate::auth::AuthService;
use crate::errors::AppError;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::wizard::{Notice, SessionView};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    mut ctx: SessionContext,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<SessionView>, AppError> {
    AuthService::new(state.store.as_ref())
        .register(&req.username, &req.password)
        .await?;

    ctx.state.show_login();
    ctx.commit(Some(Notice::success("Registration successful! Please login.")))
        .await
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    mut ctx: SessionContext,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<SessionView>, AppError> {
    let identity = AuthService::new(state.store.as_ref())
        .login(&req.username, &req.password)
        .await?;

    ctx.state.sign_in(identity);
    ctx.commit(Some(Notice::success("Login successful!"))).await
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(mut ctx: SessionContext) -> Result<Json<SessionView>, AppError> {
    ctx.reset().await?;
    Ok(Json(ctx.state.view(Some(Notice::success("You have been logged out.")))))
}
