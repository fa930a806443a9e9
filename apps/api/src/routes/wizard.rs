use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::session::MainSession;
use crate::state::AppState;
use crate::wizard::tech_stack::TECH_OPTIONS;
use crate::wizard::{Notice, PersonalDetailsForm, SessionView};

#[derive(Deserialize)]
pub struct TechStackRequest {
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

#[derive(Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// GET /api/v1/wizard/tech-options
pub async fn handle_tech_options() -> Json<&'static [&'static str]> {
    Json(TECH_OPTIONS)
}

/// POST /api/v1/wizard/step/:step
pub async fn handle_jump(
    mut main: MainSession,
    Path(step): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let step = step.parse::<u8>().map_err(|_| {
        AppError::validation(format!("step must be between 1 and 4, got {step}"))
    })?;
    main.wizard().jump_to(step)?;
    main.commit(None).await
}

/// POST /api/v1/wizard/personal-details
pub async fn handle_personal_details(
    State(state): State<AppState>,
    mut main: MainSession,
    Json(form): Json<PersonalDetailsForm>,
) -> Result<Json<SessionView>, AppError> {
    main.wizard()
        .submit_personal_details(state.store.as_ref(), form)
        .await?;
    main.commit(Some(Notice::success("Your details have been saved.")))
        .await
}

/// POST /api/v1/wizard/tech-stack
pub async fn handle_tech_stack(
    mut main: MainSession,
    Json(req): Json<TechStackRequest>,
) -> Result<Json<SessionView>, AppError> {
    main.wizard().submit_tech_stack(&req.tech_stack)?;
    main.commit(None).await
}

/// POST /api/v1/wizard/screening/ask
pub async fn handle_screening_ask(
    State(state): State<AppState>,
    mut main: MainSession,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let answer = main
        .wizard()
        .ask_screening(state.screening.as_ref(), &req.question)
        .await?;
    Ok(Json(AnswerResponse { answer }))
}

/// POST /api/v1/wizard/screening/continue
pub async fn handle_screening_continue(
    mut main: MainSession,
) -> Result<Json<SessionView>, AppError> {
    main.wizard().finish_screening()?;
    main.commit(None).await
}

/// POST /api/v1/wizard/chatbot/documents
pub async fn handle_store_document(
    State(state): State<AppState>,
    mut main: MainSession,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<SessionView>, AppError> {
    main.wizard()
        .store_document(state.embeddings.as_ref(), &req.doc_id, &req.text)
        .await?;
    main.commit(Some(Notice::success("Document stored successfully!")))
        .await
}

/// POST /api/v1/wizard/chatbot/ask
pub async fn handle_chatbot_ask(
    State(state): State<AppState>,
    mut main: MainSession,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let answer = main
        .wizard()
        .ask_chatbot(state.retrieval.as_ref(), &req.question)
        .await?;
    Ok(Json(AnswerResponse { answer }))
}
