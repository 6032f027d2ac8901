use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::Siswa;
use crate::handlers::{list_body, page_request};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::siswa_service::{CreateSiswaInput, SiswaDetail, SiswaListQuery, UpdateSiswaInput};
use crate::validation::{QueryParams, ValidatedJson};

/// POST /siswa
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<CreateSiswaInput>,
) -> ApiResult<Siswa> {
    let siswa = state.siswa_service().create(input, &user.user_id).await?;
    Ok(ApiResponse::created(siswa).with_message("Siswa berhasil ditambahkan"))
}

/// GET /siswa?kelas=&jurusan=&status=&search=&page=&limit=
pub async fn list(State(state): State<AppState>, QueryParams(query): QueryParams<SiswaListQuery>) -> ApiResult<Value> {
    let page = page_request(&state, &query.page, &query.limit);
    let result = state.siswa_service().list(&query, page).await?;
    Ok(ApiResponse::success(list_body(&result, "siswa", "total_students")?))
}

/// GET /siswa/:id - record plus per-habit journal statistics
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SiswaDetail> {
    let detail = state.siswa_service().get(&id).await?;
    Ok(ApiResponse::success(detail))
}

/// PUT /siswa/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateSiswaInput>,
) -> ApiResult<Siswa> {
    let siswa = state.siswa_service().update(&id, input).await?;
    Ok(ApiResponse::success(siswa).with_message("Data siswa berhasil diperbarui"))
}
