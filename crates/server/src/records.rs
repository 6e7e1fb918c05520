//! Medical-record handlers.
//!
//! Records are always scoped to the authenticated caller; the
//! identity comes from the verified session, never from the request
//! body.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Ctx;
use crate::config::AppState;
use crate::error::{Error, Result};
use crate::store::MedicalRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub systolic: Option<i64>,
    pub diastolic: Option<i64>,
    pub heart_rate: Option<i64>,
    pub analysis: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateRecordResponse {
    pub message: String,
    pub record: MedicalRecord,
}

/// POST /api/medical-records
pub async fn create_record(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<CreateRecordResponse>)> {
    let Some(kind) = req.kind.filter(|k| !k.is_empty()) else {
        return Err(Error::BadRequest("Invalid data".to_string()));
    };

    let record = state
        .store
        .insert_record(
            ctx.user_id(),
            &kind,
            req.systolic,
            req.diastolic,
            req.heart_rate,
            req.analysis.as_deref(),
        )
        .await?;

    info!("[Records] Saved {} record for {}", record.kind, ctx.user_id());

    Ok((
        StatusCode::CREATED,
        Json(CreateRecordResponse {
            message: "Record saved".to_string(),
            record,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct ListRecordsResponse {
    pub records: Vec<MedicalRecord>,
}

/// GET /api/medical-records
pub async fn list_records(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<ListRecordsResponse>> {
    let records = state.store.records_for_user(ctx.user_id()).await?;
    Ok(Json(ListRecordsResponse { records }))
}
