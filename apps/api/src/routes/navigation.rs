use axum::{http::HeaderMap, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::session::SessionContext;
use crate::wizard::{Page, SessionView};

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub page: Page,
}

/// GET /api/v1/session
pub async fn handle_get_session(
    headers: HeaderMap,
    mut ctx: SessionContext,
) -> Result<Json<SessionView>, AppError> {
    let mut notice = None;
    if ctx.state.page() == Page::Main {
        notice = ctx.open_main();
    }

    if notice.is_none() {
        let proto = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok());
        notice = ctx.state.https_notice(proto);
    }

    ctx.commit(notice).await
}

/// POST /api/v1/session/navigate
pub async fn handle_navigate(
    mut ctx: SessionContext,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<SessionView>, AppError> {
    let notice = match req.page {
        Page::Login => {
            ctx.state.show_login();
            None
        }
        Page::Register => {
            ctx.state.show_register();
            None
        }
        Page::Main => ctx.open_main(),
    };

    ctx.commit(notice).await
}
