//! Interview session routes.
//!
//! Every handler validates in the same order: required fields, then session
//! existence, then lifecycle state. Upstream collaborators are only invoked
//! once all three checks pass.

use axum::{
    Json, Router,
    extract::{Multipart, State, rejection::JsonRejection},
    routing::post,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use osce_core::prompt;
use osce_core::types::{Turn, VoiceGender};

use crate::error::ApiError;
use crate::state::AppState;
use crate::upstream::AudioClip;

/// Create interview router
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/init", post(init_session))
        .route("/start", post(start_session))
        .route("/process", post(process_turn))
        .route("/history", post(get_history))
        .route("/stop", post(stop_session))
}

#[derive(Debug, Deserialize)]
pub struct InitRequest {
    pub gender: Option<String>,
    #[serde(rename = "caseReference")]
    pub case_reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    /// Base64-encoded audio of the greeting
    pub audio: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub transcription: String,
    pub response_text: String,
    /// Base64-encoded audio of the reply
    pub audio: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub ok: bool,
}

/// Initialize a session bound to a clinical case
pub async fn init_session(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InitRequest>, JsonRejection>,
) -> Result<Json<InitResponse>, ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let gender = req
        .gender
        .ok_or_else(|| ApiError::validation("gender is required"))?;
    let case_reference = req
        .case_reference
        .ok_or_else(|| ApiError::validation("caseReference is required"))?;
    let voice: VoiceGender = gender.parse().map_err(ApiError::Validation)?;

    let case = state.cases.resolve(&case_reference)?;
    let instruction = prompt::system_instruction(&case);
    let session_id = state
        .sessions
        .create(voice, &case.reference, instruction)
        .await;

    info!(session_id = %session_id, case = %case.reference, "session initialized");
    Ok(Json(InitResponse { session_id }))
}

/// Start the interview; the patient speaks first
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<StartResponse>, ApiError> {
    let session_id = required_session_id(body)?;

    let slot = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id.clone()))?;
    let mut session = slot.lock().await;

    // state gate before the upstream call; Active only after synthesis succeeds
    session.ensure_can_begin()?;
    let audio = state
        .synthesis
        .synthesize(prompt::PATIENT_GREETING, session.voice)
        .await?;
    session.begin(prompt::PATIENT_GREETING)?;

    info!(session_id = %session_id, "interview started");
    Ok(Json(StartResponse {
        audio: STANDARD.encode(&audio),
        text: prompt::PATIENT_GREETING.to_string(),
    }))
}

/// Process one spoken question into the patient's spoken reply
pub async fn process_turn(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, ApiError> {
    let mut session_id: Option<String> = None;
    let mut clip: Option<AudioClip> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart payload: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("session_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("invalid session_id field: {e}")))?;
                session_id = Some(text);
            }
            Some("audio") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("invalid audio field: {e}")))?;
                clip = Some(AudioClip::new(bytes.to_vec(), file_name, content_type));
            }
            _ => {}
        }
    }

    let session_id = session_id.ok_or_else(|| ApiError::validation("session_id is required"))?;
    let clip = clip.ok_or_else(|| ApiError::validation("audio file is required"))?;
    if clip.bytes.is_empty() {
        return Err(ApiError::validation("audio file is empty"));
    }

    let slot = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id.clone()))?;
    let mut session = slot.lock().await;
    session.require_active()?;

    let transcription = state.speech_to_text.transcribe(&clip).await?;
    // the trainee's turn stays recorded even if completion or synthesis fails
    session.push_user(&transcription);

    let reply = state.chat.complete(session.transcript()).await?;
    let audio = state.synthesis.synthesize(&reply, session.voice).await?;
    session.push_assistant(&reply);

    info!(session_id = %session_id, "turn processed");
    Ok(Json(ProcessResponse {
        transcription,
        response_text: reply,
        audio: STANDARD.encode(&audio),
    }))
}

/// Return the visible transcript
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session_id = required_session_id(body)?;

    let slot = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id.clone()))?;
    let history = slot.lock().await.history();

    Ok(Json(HistoryResponse { history }))
}

/// End the interview and discard the session
pub async fn stop_session(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<Json<StopResponse>, ApiError> {
    let session_id = required_session_id(body)?;

    let slot = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id.clone()))?;
    let started_at = slot.lock().await.created_at;
    state.sessions.remove(&session_id).await;

    info!(session_id = %session_id, started_at = %started_at, "session stopped");
    Ok(Json(StopResponse { ok: true }))
}

fn required_session_id(
    body: Result<Json<SessionRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    req.session_id
        .ok_or_else(|| ApiError::validation("session_id is required"))
}
