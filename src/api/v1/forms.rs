//! Form endpoint handlers

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use super::store_error;
use crate::api::state::AppState;
use crate::api::types::{
    success, ApiError, ErrorCode, FormDetail, FormSummary, FormsQueryParams, Query, ResponseMeta,
    SuccessEnvelope,
};
use crate::domain::FormLookup;

/// GET /api/v1/formie/forms
pub async fn list_forms(
    State(state): State<AppState>,
    Query(params): Query<FormsQueryParams>,
) -> Result<Json<SuccessEnvelope<Vec<FormSummary>>>, ApiError> {
    let query = params.into_query()?;
    debug!(status = ?query.status, limit = query.limit, offset = query.offset, "Listing forms");

    let page = state
        .store
        .list_forms(&query)
        .await
        .map_err(|e| forms_error(&state, e))?;

    let mut summaries = Vec::with_capacity(page.items.len());
    for form in &page.items {
        let count = state
            .store
            .count_submissions(form.id)
            .await
            .map_err(|e| forms_error(&state, e))?;
        summaries.push(FormSummary::new(form, count));
    }

    Ok(Json(success(
        summaries,
        ResponseMeta::paged(page.total, query.limit, query.offset),
    )))
}

/// GET /api/v1/formie/forms/{id_or_handle}
pub async fn get_form(
    State(state): State<AppState>,
    Path(id_or_handle): Path<String>,
) -> Result<Json<SuccessEnvelope<FormDetail>>, ApiError> {
    let lookup = FormLookup::parse(&id_or_handle);
    debug!(lookup = %lookup, "Getting form");

    let form = state
        .store
        .find_form(&lookup)
        .await
        .map_err(|e| forms_error(&state, e))?
        .ok_or_else(|| ApiError::not_found(format!("Form with {} not found", lookup)))?;

    let count = state
        .store
        .count_submissions(form.id)
        .await
        .map_err(|e| forms_error(&state, e))?;

    Ok(Json(success(FormDetail::new(&form, count), ResponseMeta::now())))
}

fn forms_error(state: &AppState, err: crate::domain::DomainError) -> ApiError {
    store_error(
        ErrorCode::FormsFetchError,
        "Failed to fetch forms",
        err,
        state.dev_mode(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::api::state::{AppState, GatewaySettings};
    use crate::domain::form::MockFormStore;
    use crate::domain::DomainError;
    use crate::infrastructure::api_key::{KeyRegistry, KeySourceConfig, RequestAuthorizer, SlidingWindowRateLimiter};

    fn state(store: MockFormStore, dev_mode: bool) -> AppState {
        let authorizer = RequestAuthorizer::new(
            Arc::new(KeyRegistry::new(KeySourceConfig::default())),
            Arc::new(SlidingWindowRateLimiter::new()),
        );
        AppState::new(
            authorizer,
            Arc::new(store),
            GatewaySettings {
                dev_mode,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_store_failure_maps_to_fetch_error() {
        let mut store = MockFormStore::new();
        store
            .expect_list_forms()
            .returning(|_| Err(DomainError::store("connection refused")));

        let err = list_forms(
            State(state(store, false)),
            Query(FormsQueryParams::default()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), ErrorCode::FormsFetchError);
        assert!(err.response.error.detail.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_detail_in_dev_mode() {
        let mut store = MockFormStore::new();
        store
            .expect_find_form()
            .returning(|_| Err(DomainError::store("connection refused")));

        let err = get_form(State(state(store, true)), Path("contact".to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::FormsFetchError);
        assert!(err
            .response
            .error
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_missing_form_is_not_found() {
        let mut store = MockFormStore::new();
        store
            .expect_find_form()
            .withf(|lookup| *lookup == FormLookup::Id(42))
            .returning(|_| Ok(None));

        let err = get_form(State(state(store, false)), Path("42".to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.response.error.message, "Form with ID 42 not found");
    }

    #[tokio::test]
    async fn test_invalid_status_is_bad_request() {
        let err = list_forms(
            State(state(MockFormStore::new(), false)),
            Query(FormsQueryParams {
                status: Some("archived".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
