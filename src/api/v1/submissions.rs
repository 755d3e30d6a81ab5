//! Submission endpoint handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use super::store_error;
use crate::api::state::AppState;
use crate::api::types::{
    success, ApiError, ErrorCode, FormSummary, Query, ResponseMeta, SubmissionResponse,
    SubmissionsQueryParams, SuccessEnvelope,
};
use crate::domain::{DomainError, Form, FormLookup};

/// GET /api/v1/formie/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(params): Query<SubmissionsQueryParams>,
) -> Result<Json<SuccessEnvelope<Vec<SubmissionResponse>>>, ApiError> {
    let resolved_form_id = match params.form_handle().map(str::to_string) {
        Some(handle) => {
            let form = state
                .store
                .find_form(&FormLookup::Handle(handle.clone()))
                .await
                .map_err(|e| submissions_error(&state, e))?
                .ok_or_else(|| {
                    ApiError::bad_request(format!("Form with handle '{}' not found", handle))
                })?;
            Some(form.id)
        }
        None => None,
    };

    let query = params.into_query(resolved_form_id)?;
    debug!(
        form_id = ?query.form_id,
        status = ?query.status,
        limit = query.limit,
        offset = query.offset,
        "Listing submissions"
    );

    let page = state
        .store
        .list_submissions(&query)
        .await
        .map_err(|e| submissions_error(&state, e))?;

    let mut forms: HashMap<u64, Option<Form>> = HashMap::new();
    for submission in &page.items {
        if !forms.contains_key(&submission.form_id) {
            let form = state
                .store
                .find_form(&FormLookup::Id(submission.form_id))
                .await
                .map_err(|e| submissions_error(&state, e))?;
            forms.insert(submission.form_id, form);
        }
    }

    let data = page
        .items
        .iter()
        .map(|submission| {
            let form = forms.get(&submission.form_id).and_then(Option::as_ref);
            SubmissionResponse::new(submission, form, &state.transformer)
        })
        .collect();

    Ok(Json(success(
        data,
        ResponseMeta::paged(page.total, query.limit, query.offset),
    )))
}

/// GET /api/v1/formie/submissions/{id}
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessEnvelope<SubmissionResponse>>, ApiError> {
    let id: u64 = id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid submission ID '{}'", id)))?;
    debug!(submission_id = id, "Getting submission");

    let submission = state
        .store
        .find_submission(id)
        .await
        .map_err(|e| submissions_error(&state, e))?
        .ok_or_else(|| ApiError::not_found(format!("Submission with ID {} not found", id)))?;

    let form = state
        .store
        .find_form(&FormLookup::Id(submission.form_id))
        .await
        .map_err(|e| submissions_error(&state, e))?;

    let mut response = SubmissionResponse::new(&submission, form.as_ref(), &state.transformer);
    if let Some(form) = &form {
        let count = state
            .store
            .count_submissions(form.id)
            .await
            .map_err(|e| submissions_error(&state, e))?;
        response = response.with_form(FormSummary::new(form, count));
    }

    Ok(Json(success(response, ResponseMeta::now())))
}

fn submissions_error(state: &AppState, err: DomainError) -> ApiError {
    store_error(
        ErrorCode::SubmissionsFetchError,
        "Failed to fetch submissions",
        err,
        state.dev_mode(),
    )
}
