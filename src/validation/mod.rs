//! Request validation.
//!
//! Input structs derive [`validator::Validate`]; the [`ValidatedJson`]
//! extractor deserializes the body, runs the constraints and turns every
//! failure into a sorted list of `{field, message}` violations.

use std::borrow::Cow;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::database::models::parse_iso_date;
use crate::error::{ApiError, FieldViolation};
use crate::types::{Kebiasaan, ObjectId, RecordStatus, Role};

/// JSON body that has passed its declared field constraints.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::validation_error(violations(&errors)))?;

        Ok(Self(value))
    }
}

/// Query string whose rejection is reported in the standard error envelope.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// One violation per failing field (its first message), sorted by field.
pub fn violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .clone()
                    .unwrap_or_else(|| Cow::Owned(err.code.to_string()));
                FieldViolation::new(field.to_string(), message.to_string())
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn invalid(code: &'static str) -> ValidationError {
    ValidationError::new(code)
}

pub fn validate_object_id(value: &str) -> Result<(), ValidationError> {
    if ObjectId::is_valid(value) { Ok(()) } else { Err(invalid("object_id")) }
}

pub fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    parse_iso_date(value).map(|_| ()).ok_or_else(|| invalid("iso_date"))
}

pub fn validate_kebiasaan(value: &str) -> Result<(), ValidationError> {
    value.parse::<Kebiasaan>().map(|_| ()).map_err(|_| invalid("kebiasaan"))
}

pub fn validate_role(value: &str) -> Result<(), ValidationError> {
    value.parse::<Role>().map(|_| ()).map_err(|_| invalid("role"))
}

pub fn validate_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<RecordStatus>().map(|_| ()).map_err(|_| invalid("status"))
}

/// Integer sent either as a JSON number or as numeric text (`4` or `"4"`).
pub fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Character score 1-5, numeric or numeric text.
pub fn validate_nilai_karakter(value: &Value) -> Result<(), ValidationError> {
    match integer_value(value) {
        Some(n) if (1..=5).contains(&n) => Ok(()),
        _ => Err(invalid("range")),
    }
}

/// `deserialize_with` helper so length rules see the text as it will be stored.
pub fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()))
}

/// Rejects empty or whitespace-only text.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { Err(invalid("blank")) } else { Ok(()) }
}
