//! Session state machine for the intake wizard.
//!
//! Pages: `login`, `register`, `main`. Inside `main` the wizard walks
//! personal details → tech stack → screening → chatbot.
//!
//! A `SessionState` is owned by exactly one browser session. Main-wizard
//! operations live on `MainWizard`, which can only be obtained through
//! `SessionState::enter_main`, so no step logic runs for an unauthenticated
//! session.

pub mod capabilities;
pub mod experience;
pub mod tech_stack;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::candidate::{CandidateData, CandidateRecord};
use crate::models::user::UserIdentity;
use crate::store::{insert_record, Collection, DocumentStore};

use capabilities::{Answerer, EmbeddingStore};
use experience::{reconcile, DEFAULT_EXPERIENCE};
use tech_stack::validate_selection;

pub const UNAUTHORIZED_WARNING: &str = "Unauthorized Access! Please log in first.";
pub const INSECURE_TRANSPORT_WARNING: &str =
    "You are not using HTTPS. Please ensure your connection is secure.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Login,
    Register,
    Main,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Step {
    #[default]
    PersonalDetails = 1,
    TechStack = 2,
    Screening = 3,
    Chatbot = 4,
}

#[derive(Debug, Error)]
#[error("step must be between 1 and 4, got {0}")]
pub struct InvalidStep(pub u8);

impl TryFrom<u8> for Step {
    type Error = InvalidStep;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Step::PersonalDetails),
            2 => Ok(Step::TechStack),
            3 => Ok(Step::Screening),
            4 => Ok(Step::Chatbot),
            other => Err(InvalidStep(other)),
        }
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> u8 {
        step as u8
    }
}

impl Step {
    fn label(self) -> &'static str {
        match self {
            Step::PersonalDetails => "personal details",
            Step::TechStack => "tech stack",
            Step::Screening => "screening",
            Step::Chatbot => "chatbot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
}

/// Inline message shown with a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Result of a guarded navigation that was sent elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Page,
    pub notice: Notice,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    page: Page,
    authenticated: bool,
    current_step: Step,
    candidate_data: CandidateData,
    user_id: Option<String>,
    #[serde(default)]
    https_warning_shown: bool,
}

/// What the client renders after every action.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub page: Page,
    pub authenticated: bool,
    pub current_step: Step,
    pub user_id: Option<String>,
    pub candidate_data: CandidateData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl SessionState {
    pub fn page(&self) -> Page {
        self.page
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn candidate_data(&self) -> &CandidateData {
        &self.candidate_data
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn show_login(&mut self) {
        self.page = Page::Login;
    }

    pub fn show_register(&mut self) {
        self.page = Page::Register;
    }

    /// Marks the session authenticated and opens the main wizard.
    pub fn sign_in(&mut self, identity: UserIdentity) {
        info!("session signed in as '{}'", identity.username);
        self.authenticated = true;
        self.user_id = Some(identity.username);
        self.page = Page::Main;
    }

    /// Precondition for every main-wizard operation.
    ///
    /// An unauthenticated session is moved to `login` and handed back with a
    /// redirect; nothing else about it changes.
    pub fn enter_main(mut self) -> Result<MainWizard, (SessionState, Redirect)> {
        if !self.authenticated {
            warn!("unauthenticated access to main wizard, redirecting to login");
            self.page = Page::Login;
            let redirect = Redirect {
                to: Page::Login,
                notice: Notice::warning(UNAUTHORIZED_WARNING),
            };
            return Err((self, redirect));
        }

        self.page = Page::Main;
        Ok(MainWizard { state: self })
    }

    /// Warns once per session when the request did not arrive over HTTPS.
    pub fn https_notice(&mut self, forwarded_proto: Option<&str>) -> Option<Notice> {
        if self.https_warning_shown {
            return None;
        }
        if forwarded_proto.is_some_and(|proto| proto.eq_ignore_ascii_case("https")) {
            return None;
        }

        self.https_warning_shown = true;
        Some(Notice::warning(INSECURE_TRANSPORT_WARNING))
    }

    pub fn view(&self, notice: Option<Notice>) -> SessionView {
        SessionView {
            page: self.page,
            authenticated: self.authenticated,
            current_step: self.current_step,
            user_id: self.user_id.clone(),
            candidate_data: self.candidate_data.clone(),
            notice,
        }
    }
}

/// Step-1 form submission. The experience field arrives both as free text
/// and as a slider position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalDetailsForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub experience_text: Option<String>,
    pub experience_slider: Option<i64>,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub location: String,
}

/// An authenticated session inside the main wizard.
#[derive(Debug)]
pub struct MainWizard {
    state: SessionState,
}

impl MainWizard {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    /// Sidebar navigation: any step, completed or not.
    pub fn jump_to(&mut self, step: u8) -> Result<Step, AppError> {
        let step = Step::try_from(step).map_err(|e| AppError::validation(e.to_string()))?;
        self.state.current_step = step;
        Ok(step)
    }

    /// Step 1 "Save & Continue": persists the six personal-details fields,
    /// merges them into the accumulator and advances to the tech stack.
    ///
    /// The store write happens first; if it fails the session is unchanged.
    pub async fn submit_personal_details(
        &mut self,
        store: &dyn DocumentStore,
        form: PersonalDetailsForm,
    ) -> Result<CandidateRecord, AppError> {
        self.require_step(Step::PersonalDetails)?;

        if form.name.trim().is_empty() {
            warn!("personal details rejected: empty name");
            return Err(AppError::validation("Please enter your full name."));
        }

        let previous = self
            .state
            .candidate_data
            .experience
            .unwrap_or(DEFAULT_EXPERIENCE);
        let experience = reconcile(
            form.experience_text.as_deref(),
            form.experience_slider,
            previous,
        );

        let record = CandidateRecord {
            name: form.name,
            email: form.email,
            phone: form.phone,
            experience,
            position: form.position,
            location: form.location,
        };

        insert_record(store, Collection::Candidates, &record).await?;

        self.state.candidate_data.merge_record(&record);
        self.state.current_step = Step::TechStack;
        info!("candidate '{}' saved, advancing to tech stack", record.name);
        Ok(record)
    }

    /// Step 2 "Save & Continue". Updates the accumulator only.
    pub fn submit_tech_stack(&mut self, selection: &[String]) -> Result<(), AppError> {
        self.require_step(Step::TechStack)?;

        let tech_stack = validate_selection(selection).map_err(|msg| {
            warn!("tech stack rejected: {msg}");
            AppError::Validation(msg)
        })?;

        info!("tech stack of {} technologies selected", tech_stack.len());
        self.state.candidate_data.tech_stack = Some(tech_stack);
        self.state.current_step = Step::Screening;
        Ok(())
    }

    pub async fn ask_screening(
        &self,
        answerer: &dyn Answerer,
        question: &str,
    ) -> Result<String, AppError> {
        self.require_step(Step::Screening)?;
        let question = non_empty(question, "Please type your response.")?;
        Ok(answerer.answer(question).await?)
    }

    pub fn finish_screening(&mut self) -> Result<(), AppError> {
        self.require_step(Step::Screening)?;
        self.state.current_step = Step::Chatbot;
        Ok(())
    }

    pub async fn store_document(
        &self,
        embeddings: &dyn EmbeddingStore,
        doc_id: &str,
        text: &str,
    ) -> Result<(), AppError> {
        self.require_step(Step::Chatbot)?;
        let doc_id = non_empty(doc_id, "Please enter a document ID.")?;

        embeddings
            .store_document(doc_id, text)
            .await
            .map_err(|e| AppError::Capability(format!("Error storing document: {e}")))?;

        info!("stored document '{doc_id}'");
        Ok(())
    }

    pub async fn ask_chatbot(
        &self,
        answerer: &dyn Answerer,
        query: &str,
    ) -> Result<String, AppError> {
        self.require_step(Step::Chatbot)?;
        let query = non_empty(query, "Please ask a question.")?;
        Ok(answerer.answer(query).await?)
    }

    fn require_step(&self, step: Step) -> Result<(), AppError> {
        if self.state.current_step == step {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "The {} step is not active (current step: {}).",
                step.label(),
                u8::from(self.state.current_step)
            )))
        }
    }
}

fn non_empty<'a>(value: &'a str, message: &str) -> Result<&'a str, AppError> {
    if value.trim().is_empty() {
        Err(AppError::validation(message))
    } else {
        Ok(value)
    }
}
