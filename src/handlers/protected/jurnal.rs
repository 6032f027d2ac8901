use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::JurnalEntry;
use crate::handlers::{list_body, page_request};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::jurnal_service::{CreateJurnalInput, JurnalListQuery, UpdateJurnalInput};
use crate::validation::{QueryParams, ValidatedJson};

/// POST /jurnal - one entry per student, date and habit
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<CreateJurnalInput>,
) -> ApiResult<JurnalEntry> {
    let entry = state.jurnal_service().create(input, &user.user_id).await?;
    Ok(ApiResponse::created(entry).with_message("Jurnal berhasil disimpan"))
}

/// GET /jurnal?siswa_id=&tanggal_mulai=&tanggal_selesai=&kebiasaan=&kelas=&jurusan=&page=&limit=
pub async fn list(State(state): State<AppState>, QueryParams(query): QueryParams<JurnalListQuery>) -> ApiResult<Value> {
    let page = page_request(&state, &query.page, &query.limit);
    let result = state.jurnal_service().list(&query, page).await?;
    Ok(ApiResponse::success(list_body(&result, "entries", "total_entries")?))
}

/// PUT /jurnal/:id - content fields only
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateJurnalInput>,
) -> ApiResult<JurnalEntry> {
    let entry = state.jurnal_service().update(&id, input).await?;
    Ok(ApiResponse::success(entry).with_message("Jurnal berhasil diperbarui"))
}
