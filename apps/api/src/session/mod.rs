//! Cookie-keyed session storage and the extractors handlers use to reach it.
//!
//! Each browser session owns one serialized `SessionState`. Handlers load a
//! private copy, apply a single transition and write it back; nothing is
//! shared between sessions. [`locks::serialize_per_session`] makes sure two
//! requests in one session never overlap.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use tower_sessions::{
    cookie::{time::Duration, SameSite},
    Expiry, Session, SessionManagerLayer,
};

use crate::errors::AppError;
use crate::wizard::{MainWizard, Notice, SessionState, SessionView};

pub mod locks;
pub mod records;

pub use locks::{serialize_per_session, SessionLocks};
pub use records::SessionRecords;

pub const SESSION_COOKIE_NAME: &str = "talentscout_session";

/// Idle time after which a session is dropped (24 hours).
const SESSION_INACTIVITY_SECONDS: i64 = 24 * 60 * 60;

const SESSION_STATE_KEY: &str = "talentscout.state";

pub fn session_layer(
    records: SessionRecords,
    secure: bool,
) -> SessionManagerLayer<SessionRecords> {
    SessionManagerLayer::new(records)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_INACTIVITY_SECONDS,
        )))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

async fn load_state(session: &Session) -> Result<SessionState, AppError> {
    Ok(session
        .get::<SessionState>(SESSION_STATE_KEY)
        .await?
        .unwrap_or_default())
}

/// Writes `state` back unless it still equals what was loaded. An untouched
/// default state is never written, so a request that changes nothing does not
/// create a server-side record.
async fn store_state(
    session: &Session,
    loaded: &SessionState,
    state: &SessionState,
) -> Result<(), AppError> {
    if state != loaded {
        session.insert(SESSION_STATE_KEY, state).await?;
    }
    Ok(())
}

/// The caller's session state, whatever page it is on.
pub struct SessionContext {
    session: Session,
    loaded: SessionState,
    pub state: SessionState,
}

impl SessionContext {
    pub async fn save(&self) -> Result<(), AppError> {
        store_state(&self.session, &self.loaded, &self.state).await
    }

    /// Saves and renders.
    pub async fn commit(self, notice: Option<Notice>) -> Result<Json<SessionView>, AppError> {
        self.save().await?;
        Ok(Json(self.state.view(notice)))
    }

    /// Drops everything stored for this session.
    pub async fn reset(&mut self) -> Result<(), AppError> {
        self.session.flush().await?;
        self.loaded = SessionState::default();
        self.state = SessionState::default();
        Ok(())
    }

    /// Runs the main-wizard guard in place.
    ///
    /// Returns the redirect warning when the session was sent back to login.
    pub fn open_main(&mut self) -> Option<Notice> {
        match std::mem::take(&mut self.state).enter_main() {
            Ok(wizard) => {
                self.state = wizard.into_state();
                None
            }
            Err((state, redirect)) => {
                self.state = state;
                Some(redirect.notice)
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let session_state = load_state(&session)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(Self {
            session,
            loaded: session_state.clone(),
            state: session_state,
        })
    }
}

/// An authenticated session inside the main wizard.
///
/// Extraction runs the guard before the handler body: an unauthenticated
/// session is moved to `login` and the handler never runs.
pub struct MainSession {
    session: Session,
    loaded: SessionState,
    wizard: MainWizard,
}

impl MainSession {
    pub fn wizard(&mut self) -> &mut MainWizard {
        &mut self.wizard
    }

    pub async fn commit(self, notice: Option<Notice>) -> Result<Json<SessionView>, AppError> {
        store_state(&self.session, &self.loaded, self.wizard.state()).await?;
        Ok(Json(self.wizard.state().view(notice)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MainSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionContext {
            session,
            loaded,
            state: session_state,
        } = SessionContext::from_request_parts(parts, state).await?;

        match session_state.enter_main() {
            Ok(wizard) => Ok(Self {
                session,
                loaded,
                wizard,
            }),
            Err((redirected, redirect)) => {
                store_state(&session, &loaded, &redirected)
                    .await
                    .map_err(IntoResponse::into_response)?;
                Err(Json(redirected.view(Some(redirect.notice))).into_response())
            }
        }
    }
}
