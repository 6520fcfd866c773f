//! Case endpoints: overview, existence, pipelines, status, export, users.

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::{success, success_message, ApiResult, CaseQuery};
use crate::auth::{ensure_access, Identity};
use crate::errors::AppError;
use crate::models::{AccessLevel, CaseStatus, CaseUser, PipelineInfo, UpdateStatusRequest};
use crate::AppState;

/// GET /case - Case overview for the main case view.
///
/// When the case id does not resolve, the overview signals the client to go
/// back to case selection (the original rendered a selection page here).
pub async fn case_overview(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
) -> ApiResult<serde_json::Value> {
    ensure_access(&state, &identity, query.cid, AccessLevel::ReadOnly).await?;

    let Some(case) = state.repo.get_case(query.cid).await? else {
        return success(
            "Select a case",
            serde_json::json!({ "case": null, "reports": [], "reports_act": [] }),
        );
    };

    let crc = crate::models::description_crc32(&case.description);

    // Report template storage lives in the reporting subsystem; the lists stay
    // in the payload so the page contract is stable.
    success(
        "",
        serde_json::json!({
            "case": case,
            "crc32": crc,
            "reports": [],
            "reports_act": [],
        }),
    )
}

/// GET /case/exists - Check that a case id resolves.
pub async fn case_exists_check(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
) -> ApiResult<()> {
    ensure_access(&state, &identity, query.cid, AccessLevel::ReadOnly).await?;

    if state.repo.case_exists(query.cid).await? {
        success_message("Case exists")
    } else {
        Err(AppError::NotFound("Case does not exist".to_string()))
    }
}

/// GET /case/pipelines-modal - Data for the pipeline-selection modal.
pub async fn pipelines_modal(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
) -> ApiResult<serde_json::Value> {
    ensure_access(&state, &identity, query.cid, AccessLevel::FullAccess).await?;

    let Some(case) = state.repo.get_case(query.cid).await? else {
        return Err(AppError::Validation("Invalid case ID".to_string()));
    };

    success(
        "",
        serde_json::json!({
            "case": case,
            "pipelines": PipelineInfo::available(),
        }),
    )
}

/// GET /case/export - Full case export document.
pub async fn export_case(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
) -> ApiResult<serde_json::Value> {
    ensure_access(&state, &identity, query.cid, AccessLevel::ReadOnly).await?;

    match state.repo.export_case_json(query.cid).await? {
        Some(document) => success("", document),
        None => Err(AppError::Validation("Invalid case ID".to_string())),
    }
}

/// GET /case/users/list - Users with access to the case.
pub async fn case_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
) -> ApiResult<Vec<CaseUser>> {
    ensure_access(&state, &identity, query.cid, AccessLevel::ReadOnly).await?;

    let users = state.repo.list_case_users(query.cid).await?;
    success("", users)
}

/// POST /case/update-status - Set the case status.
///
/// Rejects non-integer input and ids outside the known enumeration without
/// touching the stored status. Status changes are not broadcast to the
/// collaboration room.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<i64> {
    ensure_access(&state, &identity, query.cid, AccessLevel::FullAccess).await?;

    if !state.repo.case_exists(query.cid).await? {
        return Err(AppError::Validation("Invalid case ID".to_string()));
    }

    let Some(status_id) = request.status_id_as_int() else {
        return Err(AppError::Validation("Invalid status".to_string()));
    };

    let Some(status) = CaseStatus::from_id(status_id) else {
        return Err(AppError::Validation("Invalid status".to_string()));
    };

    state.repo.set_status(query.cid, status).await?;

    success("Case status updated", status.as_id())
}
