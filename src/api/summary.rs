//! Case summary endpoints: fetch and collaborative update.

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::{success, ApiResult, CaseQuery};
use crate::auth::{ensure_access, Identity, RequestOrigin};
use crate::collab::{case_channel, EventKind, OutboundEvent};
use crate::errors::AppError;
use crate::models::{AccessLevel, CaseSummary, UpdateSummaryRequest};
use crate::AppState;

/// GET /case/summary/fetch - Current description and its checksum.
pub async fn summary_fetch(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
) -> ApiResult<CaseSummary> {
    ensure_access(&state, &identity, query.cid, AccessLevel::ReadOnly).await?;

    let Some((description, crc)) = state.repo.get_desc_crc(query.cid).await? else {
        return Err(AppError::Validation("Invalid case ID".to_string()));
    };

    success(
        "Summary fetch",
        CaseSummary {
            case_description: description,
            crc32: crc,
        },
    )
}

/// POST /case/summary/update - Persist a new description.
///
/// Machine-originated saves are pushed to the whole case room so every open
/// view picks up the authoritative value; a browser session's own save is not
/// echoed back to it (its room peers are notified over the socket path by the
/// editing client instead).
pub async fn summary_update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CaseQuery>,
    Json(request): Json<UpdateSummaryRequest>,
) -> ApiResult<u32> {
    ensure_access(&state, &identity, query.cid, AccessLevel::FullAccess).await?;

    if !state.repo.case_exists(query.cid).await? {
        return Err(AppError::Validation("Invalid case ID".to_string()));
    }

    let crc = state
        .repo
        .set_description(query.cid, &request.case_description)
        .await?;

    let from_api = identity.origin == RequestOrigin::Api;
    state
        .repo
        .track_activity(query.cid, identity.user.id, "updated summary", false, from_api)
        .await?;

    if from_api {
        let event = OutboundEvent {
            kind: EventKind::Save,
            data: serde_json::json!({
                "channel": case_channel(query.cid),
                "case_description": request.case_description,
                "last_saved": identity.user.login,
            }),
        };
        let delivered = state
            .collab
            .publish(&case_channel(query.cid), event, None)
            .await;
        tracing::debug!(case_id = query.cid, delivered, "summary save broadcast");
    }

    success("Summary updated", crc)
}
