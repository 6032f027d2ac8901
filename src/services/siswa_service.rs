use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use validator::Validate;

use super::{non_empty, optional_text, parse_path_id, take, ServiceError};
use crate::database::models::{parse_iso_date, Document, JurnalEntry, Siswa};
use crate::database::{DatabaseError, JsonDocument, Repository};
use crate::filter::{contains_pattern, Page, PageRequest};
use crate::types::{ObjectId, RecordStatus};
use crate::validation::{trimmed, validate_iso_date, validate_not_blank, validate_status};

pub const DUPLICATE_NIS: &str = "NIS sudah terdaftar";
const DEFAULT_ORDER: &str = "nama_lengkap asc";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSiswaInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "NIS harus 8-10 karakter"),
        length(min = 8, max = 10, message = "NIS harus 8-10 karakter")
    )]
    pub nis: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Nama minimal 3 karakter"),
        length(min = 3, message = "Nama minimal 3 karakter")
    )]
    pub nama_lengkap: Option<String>,

    #[validate(
        required(message = "Kelas wajib diisi"),
        custom(function = "validate_not_blank", message = "Kelas wajib diisi")
    )]
    pub kelas: Option<String>,

    #[validate(
        required(message = "Jurusan wajib diisi"),
        custom(function = "validate_not_blank", message = "Jurusan wajib diisi")
    )]
    pub jurusan: Option<String>,

    #[validate(email(message = "Email tidak valid"))]
    pub email: Option<String>,

    pub no_hp: Option<String>,
    pub alamat: Option<String>,

    #[validate(custom(function = "validate_iso_date", message = "Format tanggal tidak valid"))]
    pub tanggal_lahir: Option<String>,

    pub jenis_kelamin: Option<String>,
    pub nama_orang_tua: Option<String>,
    pub no_hp_orang_tua: Option<String>,
}

/// Partial update. `nis` is not accepted.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateSiswaInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 3, message = "Nama minimal 3 karakter"))]
    pub nama_lengkap: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "Kelas wajib diisi"))]
    pub kelas: Option<String>,

    #[validate(custom(function = "validate_not_blank", message = "Jurusan wajib diisi"))]
    pub jurusan: Option<String>,

    #[validate(email(message = "Email tidak valid"))]
    pub email: Option<String>,

    pub no_hp: Option<String>,
    pub alamat: Option<String>,

    #[validate(custom(function = "validate_iso_date", message = "Format tanggal tidak valid"))]
    pub tanggal_lahir: Option<String>,

    pub jenis_kelamin: Option<String>,
    pub nama_orang_tua: Option<String>,
    pub no_hp_orang_tua: Option<String>,

    #[validate(custom(function = "validate_status", message = "Status tidak valid"))]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SiswaListQuery {
    pub kelas: Option<String>,
    pub jurusan: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Per-habit journal totals for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KebiasaanStatistic {
    pub kebiasaan: String,
    pub total_entries: i64,
    pub avg_nilai: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SiswaDetail {
    pub siswa: Siswa,
    pub jurnal_statistics: Vec<KebiasaanStatistic>,
}

pub struct SiswaService {
    siswa: Repository<Siswa>,
    jurnal: Repository<JurnalEntry>,
}

impl SiswaService {
    pub fn new(siswa: Repository<Siswa>, jurnal: Repository<JurnalEntry>) -> Self {
        Self { siswa, jurnal }
    }

    pub async fn create(&self, input: CreateSiswaInput, created_by: &str) -> Result<Siswa, ServiceError> {
        let nis = take(input.nis);

        if self.siswa.find_one(json!({ "nis": nis })).await?.is_some() {
            warn!("Student create rejected, NIS {} exists", nis);
            return Err(ServiceError::AlreadyExists(DUPLICATE_NIS.to_string()));
        }

        let now = Utc::now();
        let siswa = Siswa {
            id: ObjectId::new(),
            nis,
            nama_lengkap: take(input.nama_lengkap),
            kelas: take(input.kelas).trim().to_string(),
            jurusan: take(input.jurusan).trim().to_string(),
            email: optional_text(input.email),
            no_hp: optional_text(input.no_hp),
            alamat: optional_text(input.alamat),
            tanggal_lahir: input.tanggal_lahir.as_deref().and_then(parse_iso_date),
            jenis_kelamin: optional_text(input.jenis_kelamin),
            nama_orang_tua: optional_text(input.nama_orang_tua),
            no_hp_orang_tua: optional_text(input.no_hp_orang_tua),
            status: RecordStatus::Active,
            created_by: Some(created_by.to_string()),
            created_at: now,
            updated_at: now,
        };

        match self.siswa.create(&siswa).await {
            Ok(()) => {}
            Err(DatabaseError::Conflict(_)) => {
                return Err(ServiceError::AlreadyExists(DUPLICATE_NIS.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        info!("Created student {} ({})", siswa.nis, siswa.id);
        Ok(siswa)
    }

    pub async fn list(&self, query: &SiswaListQuery, page: PageRequest) -> Result<Page<Siswa>, ServiceError> {
        Ok(self.siswa.list(Self::list_filter(query), DEFAULT_ORDER, page).await?)
    }

    /// Status defaults to active; search matches name or NIS, case-insensitively.
    pub fn list_filter(query: &SiswaListQuery) -> Value {
        let mut clauses = vec![json!({ "status": non_empty(&query.status).unwrap_or("active") })];
        if let Some(kelas) = non_empty(&query.kelas) {
            clauses.push(json!({ "kelas": kelas }));
        }
        if let Some(jurusan) = non_empty(&query.jurusan) {
            clauses.push(json!({ "jurusan": jurusan }));
        }
        if let Some(search) = non_empty(&query.search) {
            let pattern = contains_pattern(search);
            clauses.push(json!({ "$or": [
                { "nama_lengkap": { "$ilike": pattern } },
                { "nis": { "$ilike": pattern } }
            ]}));
        }
        json!({ "$and": clauses })
    }

    pub async fn get(&self, id: &str) -> Result<SiswaDetail, ServiceError> {
        let id = parse_path_id(id, Siswa::NOT_FOUND)?.to_hex();
        let (siswa, stats) = futures::try_join!(
            self.siswa.find_by_id(&id),
            self.jurnal.group_summary(json!({ "siswa_id": id }), "kebiasaan", "nilai_karakter"),
        )?;

        let jurnal_statistics = stats
            .into_iter()
            .map(|g| KebiasaanStatistic {
                kebiasaan: g.key,
                total_entries: g.count,
                avg_nilai: g.average,
            })
            .collect();

        Ok(SiswaDetail { siswa, jurnal_statistics })
    }

    pub async fn update(&self, id: &str, input: UpdateSiswaInput) -> Result<Siswa, ServiceError> {
        let id = parse_path_id(id, Siswa::NOT_FOUND)?.to_hex();
        let patch = Self::patch_from(input)?;
        self.siswa.update_partial(&id, patch).await?;
        info!("Updated student {}", id);
        Ok(self.siswa.find_by_id(&id).await?)
    }

    fn patch_from(input: UpdateSiswaInput) -> Result<JsonDocument, ServiceError> {
        let mut patch = Map::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                patch.insert(key.to_string(), Value::String(v.trim().to_string()));
            }
        };
        set("nama_lengkap", input.nama_lengkap);
        set("kelas", input.kelas);
        set("jurusan", input.jurusan);
        set("email", input.email);
        set("no_hp", input.no_hp);
        set("alamat", input.alamat);
        set("jenis_kelamin", input.jenis_kelamin);
        set("nama_orang_tua", input.nama_orang_tua);
        set("no_hp_orang_tua", input.no_hp_orang_tua);
        set("status", input.status);

        if let Some(raw) = input.tanggal_lahir {
            let date = parse_iso_date(&raw)
                .ok_or_else(|| ServiceError::invalid("tanggal_lahir", "Format tanggal tidak valid"))?;
            patch.insert("tanggal_lahir".to_string(), Value::String(date.to_string()));
        }
        Ok(patch)
    }
}
