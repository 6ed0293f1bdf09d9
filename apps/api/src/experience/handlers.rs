use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::experience::models::{ExperienceSummary, ParsedPosition, RawEntry, StructuredExperience};
use crate::experience::{
    calculate_total_experience_duration, convert_structured_experience,
    format_experience_with_duration, parse_experience_string,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub position: Option<ParsedPosition>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub entries: Vec<RawEntry>,
}

#[derive(Debug, Serialize)]
pub struct FormatResponse {
    pub formatted: String,
}

/// POST /api/v1/experience/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<ParseResponse>, AppError> {
    let Json(req) = payload?;
    require_text(&req.text)?;
    let position = parse_experience_string(&req.text, state.clock.as_ref());
    Ok(Json(ParseResponse { position }))
}

/// POST /api/v1/experience/convert
pub async fn handle_convert(
    State(state): State<AppState>,
    payload: Result<Json<StructuredExperience>, JsonRejection>,
) -> Result<Json<ParsedPosition>, AppError> {
    let Json(entry) = payload?;
    Ok(Json(convert_structured_experience(
        &entry,
        state.clock.as_ref(),
    )))
}

/// POST /api/v1/experience/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<ExperienceSummary>, AppError> {
    let Json(req) = payload?;
    if req.entries.len() > state.config.max_entries {
        return Err(AppError::Validation(format!(
            "At most {} entries per request, got {}",
            state.config.max_entries,
            req.entries.len()
        )));
    }
    Ok(Json(calculate_total_experience_duration(
        &req.entries,
        state.clock.as_ref(),
    )))
}

/// POST /api/v1/experience/format
pub async fn handle_format(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<FormatResponse>, AppError> {
    let Json(req) = payload?;
    require_text(&req.text)?;
    let formatted = format_experience_with_duration(&req.text, state.clock.as_ref());
    Ok(Json(FormatResponse { formatted }))
}

fn require_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    Ok(())
}
