use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::Guru;
use crate::handlers::{list_body, page_request};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::guru_service::{CreateGuruInput, GuruListQuery, UpdateGuruInput};
use crate::validation::{QueryParams, ValidatedJson};

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<CreateGuruInput>,
) -> ApiResult<Guru> {
    let guru = state.guru_service().create(input, &user.user_id).await?;
    Ok(ApiResponse::created(guru).with_message("Guru berhasil ditambahkan"))
}

pub async fn list(State(state): State<AppState>, QueryParams(query): QueryParams<GuruListQuery>) -> ApiResult<Value> {
    let page = page_request(&state, &query.page, &query.limit);
    let result = state.guru_service().list(&query, page).await?;
    Ok(ApiResponse::success(list_body(&result, "guru", "total_teachers")?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Guru> {
    Ok(ApiResponse::success(state.guru_service().get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateGuruInput>,
) -> ApiResult<Guru> {
    let guru = state.guru_service().update(&id, input).await?;
    Ok(ApiResponse::success(guru).with_message("Data guru berhasil diperbarui"))
}
