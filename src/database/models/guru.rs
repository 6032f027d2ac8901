use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Document;
use crate::types::{ObjectId, RecordStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guru {
    pub id: ObjectId,
    pub nip: String,
    pub nama_lengkap: String,
    pub email: Option<String>,
    pub no_hp: Option<String>,
    pub mata_pelajaran: Option<String>,
    pub jenis_kelamin: Option<String>,
    pub alamat: Option<String>,
    pub status: RecordStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Guru {
    const COLLECTION: &'static str = "guru";
    const NOT_FOUND: &'static str = "Guru tidak ditemukan";
}
