use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use validator::Validate;

use super::{non_empty, optional_text, parse_path_id, take, ServiceError};
use crate::database::models::{Document, Guru};
use crate::database::{DatabaseError, JsonDocument, Repository};
use crate::filter::{contains_pattern, Page, PageRequest};
use crate::types::{ObjectId, RecordStatus};
use crate::validation::{trimmed, validate_not_blank, validate_status};

pub const DUPLICATE_NIP: &str = "NIP sudah terdaftar";
const DEFAULT_ORDER: &str = "nama_lengkap asc";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGuruInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "NIP harus 8-20 karakter"),
        length(min = 8, max = 20, message = "NIP harus 8-20 karakter")
    )]
    pub nip: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Nama minimal 3 karakter"),
        length(min = 3, message = "Nama minimal 3 karakter")
    )]
    pub nama_lengkap: Option<String>,

    #[validate(email(message = "Email tidak valid"))]
    pub email: Option<String>,

    pub no_hp: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "Mata pelajaran wajib diisi"))]
    pub mata_pelajaran: Option<String>,

    pub jenis_kelamin: Option<String>,
    pub alamat: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateGuruInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 3, message = "Nama minimal 3 karakter"))]
    pub nama_lengkap: Option<String>,

    #[validate(email(message = "Email tidak valid"))]
    pub email: Option<String>,

    pub no_hp: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "Mata pelajaran wajib diisi"))]
    pub mata_pelajaran: Option<String>,

    pub jenis_kelamin: Option<String>,
    pub alamat: Option<String>,

    #[validate(custom(function = "validate_status", message = "Status tidak valid"))]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GuruListQuery {
    pub mata_pelajaran: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub struct GuruService {
    guru: Repository<Guru>,
}

impl GuruService {
    pub fn new(guru: Repository<Guru>) -> Self {
        Self { guru }
    }

    pub async fn create(&self, input: CreateGuruInput, created_by: &str) -> Result<Guru, ServiceError> {
        let nip = take(input.nip);

        if self.guru.find_one(json!({ "nip": nip })).await?.is_some() {
            warn!("Teacher create rejected, NIP {} exists", nip);
            return Err(ServiceError::AlreadyExists(DUPLICATE_NIP.to_string()));
        }

        let now = Utc::now();
        let guru = Guru {
            id: ObjectId::new(),
            nip,
            nama_lengkap: take(input.nama_lengkap),
            email: optional_text(input.email),
            no_hp: optional_text(input.no_hp),
            mata_pelajaran: optional_text(input.mata_pelajaran),
            jenis_kelamin: optional_text(input.jenis_kelamin),
            alamat: optional_text(input.alamat),
            status: RecordStatus::Active,
            created_by: Some(created_by.to_string()),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.guru.create(&guru).await {
            return Err(match e {
                DatabaseError::Conflict(_) => ServiceError::AlreadyExists(DUPLICATE_NIP.to_string()),
                other => other.into(),
            });
        }

        info!("Created teacher {} ({})", guru.nip, guru.id);
        Ok(guru)
    }

    pub async fn list(&self, query: &GuruListQuery, page: PageRequest) -> Result<Page<Guru>, ServiceError> {
        Ok(self.guru.list(Self::list_filter(query), DEFAULT_ORDER, page).await?)
    }

    pub fn list_filter(query: &GuruListQuery) -> Value {
        let mut clauses = vec![json!({ "status": non_empty(&query.status).unwrap_or("active") })];
        if let Some(mapel) = non_empty(&query.mata_pelajaran) {
            clauses.push(json!({ "mata_pelajaran": mapel }));
        }
        if let Some(search) = non_empty(&query.search) {
            let pattern = contains_pattern(search);
            clauses.push(json!({ "$or": [
                { "nama_lengkap": { "$ilike": pattern } },
                { "nip": { "$ilike": pattern } }
            ]}));
        }
        json!({ "$and": clauses })
    }

    pub async fn get(&self, id: &str) -> Result<Guru, ServiceError> {
        let id = parse_path_id(id, Guru::NOT_FOUND)?;
        Ok(self.guru.find_by_id(&id.to_hex()).await?)
    }

    pub async fn update(&self, id: &str, input: UpdateGuruInput) -> Result<Guru, ServiceError> {
        let id = parse_path_id(id, Guru::NOT_FOUND)?.to_hex();

        let mut patch: JsonDocument = Map::new();
        for (key, value) in [
            ("nama_lengkap", input.nama_lengkap),
            ("email", input.email),
            ("no_hp", input.no_hp),
            ("mata_pelajaran", input.mata_pelajaran),
            ("jenis_kelamin", input.jenis_kelamin),
            ("alamat", input.alamat),
            ("status", input.status),
        ] {
            if let Some(v) = value {
                patch.insert(key.to_string(), Value::String(v.trim().to_string()));
            }
        }

        self.guru.update_partial(&id, patch).await?;
        info!("Updated teacher {}", id);
        Ok(self.guru.find_by_id(&id).await?)
    }
}
