//! Journal entries for the 7 Kebiasaan Anak Indonesia Hebat.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use validator::Validate;

use super::{non_empty, optional_text, parse_path_id, take, ServiceError};
use crate::database::models::{parse_iso_date, Document, JurnalEntry, Siswa, JURNAL_STATUS_SUBMITTED};
use crate::database::{DatabaseError, JsonDocument, Repository};
use crate::filter::{Page, PageRequest};
use crate::types::{Kebiasaan, ObjectId};
use crate::validation::{integer_value, validate_iso_date, validate_kebiasaan, validate_nilai_karakter, validate_object_id};

pub const DUPLICATE_ENTRY: &str = "Jurnal untuk kebiasaan ini sudah ada pada tanggal tersebut";
const DEFAULT_ORDER: &str = "tanggal desc, created_at desc";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJurnalInput {
    #[validate(
        required(message = "ID siswa tidak valid"),
        custom(function = "validate_object_id", message = "ID siswa tidak valid")
    )]
    pub siswa_id: Option<String>,

    #[validate(
        required(message = "Format tanggal tidak valid"),
        custom(function = "validate_iso_date", message = "Format tanggal tidak valid")
    )]
    pub tanggal: Option<String>,

    #[validate(
        required(message = "Kebiasaan tidak valid"),
        custom(function = "validate_kebiasaan", message = "Kebiasaan tidak valid")
    )]
    pub kebiasaan: Option<String>,

    #[validate(
        required(message = "Aktivitas minimal 10 karakter"),
        length(min = 10, message = "Aktivitas minimal 10 karakter")
    )]
    pub aktivitas: Option<String>,

    #[validate(
        required(message = "Refleksi minimal 20 karakter"),
        length(min = 20, message = "Refleksi minimal 20 karakter")
    )]
    pub refleksi: Option<String>,

    /// `4` or `"4"`.
    #[validate(
        required(message = "Nilai karakter 1-5"),
        custom(function = "validate_nilai_karakter", message = "Nilai karakter 1-5")
    )]
    pub nilai_karakter: Option<Value>,

    pub foto_kegiatan: Option<String>,
    pub catatan_guru: Option<String>,
}

/// Content fields only; identity fields are rejected as unknown.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateJurnalInput {
    #[validate(length(min = 10, message = "Aktivitas minimal 10 karakter"))]
    pub aktivitas: Option<String>,

    #[validate(length(min = 20, message = "Refleksi minimal 20 karakter"))]
    pub refleksi: Option<String>,

    #[validate(custom(function = "validate_nilai_karakter", message = "Nilai karakter 1-5"))]
    pub nilai_karakter: Option<Value>,

    pub catatan_guru: Option<String>,
    pub foto_kegiatan: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JurnalListQuery {
    pub siswa_id: Option<String>,
    pub tanggal_mulai: Option<String>,
    pub tanggal_selesai: Option<String>,
    pub kebiasaan: Option<String>,
    pub kelas: Option<String>,
    pub jurusan: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KebiasaanList {
    pub kebiasaan: Vec<&'static str>,
    pub total: usize,
}

pub struct JurnalService {
    jurnal: Repository<JurnalEntry>,
    siswa: Repository<Siswa>,
}

impl JurnalService {
    pub fn new(jurnal: Repository<JurnalEntry>, siswa: Repository<Siswa>) -> Self {
        Self { jurnal, siswa }
    }

    pub fn habits() -> KebiasaanList {
        let kebiasaan = Kebiasaan::names();
        KebiasaanList {
            total: kebiasaan.len(),
            kebiasaan,
        }
    }

    pub async fn create(&self, input: CreateJurnalInput, created_by: &str) -> Result<JurnalEntry, ServiceError> {
        let siswa_id: ObjectId = take(input.siswa_id)
            .parse()
            .map_err(|_| ServiceError::invalid("siswa_id", "ID siswa tidak valid"))?;
        let tanggal = input
            .tanggal
            .as_deref()
            .and_then(parse_iso_date)
            .ok_or_else(|| ServiceError::invalid("tanggal", "Format tanggal tidak valid"))?;
        let kebiasaan: Kebiasaan = take(input.kebiasaan)
            .parse()
            .map_err(|_| ServiceError::invalid("kebiasaan", "Kebiasaan tidak valid"))?;
        let nilai_karakter = nilai_karakter(input.nilai_karakter.as_ref())?;

        // 1. Student must exist
        let siswa = self
            .siswa
            .get(&siswa_id.to_hex())
            .await?
            .ok_or_else(|| ServiceError::NotFound(Siswa::NOT_FOUND.to_string()))?;

        // 2. One entry per student, date and habit
        let existing = self
            .jurnal
            .find_one(json!({
                "siswa_id": siswa_id.to_hex(),
                "tanggal": tanggal.to_string(),
                "kebiasaan": kebiasaan.as_str(),
            }))
            .await?;
        if existing.is_some() {
            warn!("Duplicate journal for {} {} {}", siswa_id, tanggal, kebiasaan);
            return Err(ServiceError::Duplicate(DUPLICATE_ENTRY.to_string()));
        }

        // 3. Snapshot the student's current name, class and major
        let now = Utc::now();
        let entry = JurnalEntry {
            id: ObjectId::new(),
            siswa_id,
            nama_siswa: siswa.nama_lengkap,
            kelas: siswa.kelas,
            jurusan: siswa.jurusan,
            tanggal,
            kebiasaan,
            aktivitas: take(input.aktivitas),
            refleksi: take(input.refleksi),
            nilai_karakter,
            foto_kegiatan: optional_text(input.foto_kegiatan),
            catatan_guru: input.catatan_guru.unwrap_or_default(),
            status: JURNAL_STATUS_SUBMITTED.to_string(),
            created_by: Some(created_by.to_string()),
            created_at: now,
            updated_at: now,
        };

        match self.jurnal.create(&entry).await {
            Ok(()) => {}
            Err(DatabaseError::Conflict(_)) => {
                warn!("Journal insert lost a race for {} {} {}", siswa_id, tanggal, kebiasaan);
                return Err(ServiceError::Duplicate(DUPLICATE_ENTRY.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        info!("Saved journal {} for student {}", entry.id, entry.siswa_id);
        Ok(entry)
    }

    pub async fn list(&self, query: &JurnalListQuery, page: PageRequest) -> Result<Page<JurnalEntry>, ServiceError> {
        let filter = Self::list_filter(query)?;
        Ok(self.jurnal.list(filter, DEFAULT_ORDER, page).await?)
    }

    /// Exact-match filters plus an inclusive `tanggal` range.
    pub fn list_filter(query: &JurnalListQuery) -> Result<Value, ServiceError> {
        let mut filter = Map::new();

        if let Some(siswa_id) = non_empty(&query.siswa_id) {
            if !ObjectId::is_valid(siswa_id) {
                return Err(ServiceError::invalid("siswa_id", "ID siswa tidak valid"));
            }
            filter.insert("siswa_id".into(), json!(siswa_id.to_ascii_lowercase()));
        }
        for (key, value) in [
            ("kebiasaan", &query.kebiasaan),
            ("kelas", &query.kelas),
            ("jurusan", &query.jurusan),
        ] {
            if let Some(v) = non_empty(value) {
                filter.insert(key.into(), json!(v));
            }
        }

        let mut range = Map::new();
        for (param, op, value) in [
            ("tanggal_mulai", "$gte", &query.tanggal_mulai),
            ("tanggal_selesai", "$lte", &query.tanggal_selesai),
        ] {
            if let Some(raw) = non_empty(value) {
                let date = parse_iso_date(raw)
                    .ok_or_else(|| ServiceError::invalid(param, "Format tanggal tidak valid"))?;
                range.insert(op.into(), json!(date.to_string()));
            }
        }
        if !range.is_empty() {
            filter.insert("tanggal".into(), Value::Object(range));
        }

        Ok(Value::Object(filter))
    }

    pub async fn update(&self, id: &str, input: UpdateJurnalInput) -> Result<JurnalEntry, ServiceError> {
        let id = parse_path_id(id, JurnalEntry::NOT_FOUND)?.to_hex();

        let mut patch: JsonDocument = Map::new();
        if let Some(v) = input.aktivitas {
            patch.insert("aktivitas".into(), json!(v));
        }
        if let Some(v) = input.refleksi {
            patch.insert("refleksi".into(), json!(v));
        }
        if let Some(v) = input.nilai_karakter.as_ref() {
            patch.insert("nilai_karakter".into(), json!(nilai_karakter(Some(v))?));
        }
        if let Some(v) = input.catatan_guru {
            patch.insert("catatan_guru".into(), json!(v));
        }
        if let Some(v) = input.foto_kegiatan {
            patch.insert("foto_kegiatan".into(), json!(optional_text(Some(v))));
        }

        self.jurnal.update_partial(&id, patch).await?;
        info!("Updated journal {}", id);
        Ok(self.jurnal.find_by_id(&id).await?)
    }
}

fn nilai_karakter(value: Option<&Value>) -> Result<i32, ServiceError> {
    value
        .and_then(integer_value)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| ServiceError::invalid("nilai_karakter", "Nilai karakter 1-5"))
}
