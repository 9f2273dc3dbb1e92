use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use invite::{
    FieldError, RsvpRecord, RsvpSubmission, ValidationErrors, is_valid_email,
    payloads::{
        ConfirmationRequest, ConfirmationResponse, SearchNamesRequest, SearchNamesResponse,
        SubmitResponse, VerifyNameRequest, VerifyNameResponse, VerifyPinRequest,
        VerifyPinResponse,
    },
    validate_submission,
};
use tracing::{error, info};

use crate::{
    database::{Appended, StoreError},
    error::AppError,
    notifier::notify,
    search::suggest,
    state::AppState,
    utils::{bounded, mask_email},
};

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn verify_name_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyNameRequest>, JsonRejection>,
) -> Result<Json<VerifyNameResponse>, AppError> {
    let Json(request) = payload?;
    let name = non_blank(request.name).ok_or(AppError::MissingField("Name is required"))?;

    let admission = state.gate.verify(&name).await.map_err(|e| {
        error!("Name validation failed: {e}");
        AppError::from(e)
    })?;

    info!(name, admitted = admission.is_admitted(), "Checked guest name");

    Ok(Json(admission.into()))
}

pub async fn search_names_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchNamesRequest>, JsonRejection>,
) -> Result<Json<SearchNamesResponse>, AppError> {
    let Json(request) = payload?;
    let raw = request.search.unwrap_or_default();

    let suggestions = suggest(state.guests.as_ref(), &raw, state.config.service_timeout)
        .await
        .map_err(|e| {
            error!("Name search failed: {e}");
            AppError::ServiceUnavailable(e)
        })?;

    Ok(Json(SearchNamesResponse { suggestions }))
}

pub async fn verify_pin_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyPinRequest>, JsonRejection>,
) -> Result<Json<VerifyPinResponse>, AppError> {
    let Json(request) = payload?;
    let pin = request.pin.unwrap_or_default();

    let admission = state.gate.verify(&pin).await.map_err(|e| {
        error!("PIN verification failed: {e}");
        AppError::from(e)
    })?;

    info!(admitted = admission.is_admitted(), "Checked PIN");

    Ok(Json(VerifyPinResponse {
        is_valid: admission.is_admitted(),
    }))
}

pub async fn rsvp_submit_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RsvpSubmission>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(submission) = payload?;
    validate_submission(&submission).map_err(AppError::Validation)?;

    let record = RsvpRecord::from_submission(&submission, Utc::now());

    // The append runs to completion even if the deadline passes or the client goes away.
    let rsvps = state.rsvps.clone();
    let pending = record.clone();
    let append = tokio::spawn(async move { rsvps.append(&pending).await });

    let appended = bounded(state.config.service_timeout, async {
        append
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
    })
    .await
    .map_err(|e| {
        error!(name = %record.name, "Failed to persist RSVP: {e}");
        AppError::Persistence(e)
    })?;

    let duplicate = appended == Appended::Duplicate;
    info!(
        name = %record.name,
        attending = %record.attending,
        duplicate,
        "Recorded RSVP"
    );

    Ok(Json(SubmitResponse {
        success: true,
        duplicate,
    }))
}

pub async fn send_confirmation_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConfirmationRequest>, JsonRejection>,
) -> Result<Json<ConfirmationResponse>, AppError> {
    let Json(request) = payload?;

    let (Some(email), Some(name), Some(attending)) = (
        non_blank(request.email),
        non_blank(request.name),
        request.attending,
    ) else {
        return Err(AppError::MissingField("Missing required fields"));
    };

    if !is_valid_email(&email) {
        return Err(AppError::Validation(ValidationErrors(vec![
            FieldError::InvalidEmail,
        ])));
    }

    notify(
        state.mailer.as_ref(),
        &state.config.sender(),
        &email,
        &name,
        attending,
        state.config.service_timeout,
    )
    .await
    .map_err(|e| {
        error!(to = %mask_email(&email), "Failed to send email: {e}");
        AppError::Notification(e)
    })?;

    Ok(Json(ConfirmationResponse {
        success: true,
        error: None,
    }))
}
