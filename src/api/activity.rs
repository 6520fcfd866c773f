//! Activity feed endpoints.

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::{success, ApiResult, CaseQuery};
use crate::auth::{ensure_access, Identity, RequestOrigin};
use crate::models::{AccessLevel, Activity, ActivityEntry, TaskLogRequest};
use crate::AppState;

/// GET /case/activities/list - Up to 40 most recent activity records.
pub async fn activity_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
) -> ApiResult<Vec<ActivityEntry>> {
    ensure_access(&state, &identity, query.cid, AccessLevel::ReadOnly).await?;

    let entries = state.repo.list_activities(query.cid).await?;
    success("", entries)
}

/// POST /case/tasklog/add - Append a user-submitted log entry.
pub async fn tasklog_add(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
    Json(request): Json<TaskLogRequest>,
) -> ApiResult<Activity> {
    ensure_access(&state, &identity, query.cid, AccessLevel::FullAccess).await?;

    let content = request.validate()?.to_string();

    let from_api = identity.origin == RequestOrigin::Api;
    let record = state
        .repo
        .track_activity(query.cid, identity.user.id, &content, true, from_api)
        .await?;

    success("Log saved", record)
}
