use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Document;
use crate::types::{ObjectId, RecordStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Siswa {
    pub id: ObjectId,
    pub nis: String,
    pub nama_lengkap: String,
    pub kelas: String,
    pub jurusan: String,
    pub email: Option<String>,
    pub no_hp: Option<String>,
    pub alamat: Option<String>,
    pub tanggal_lahir: Option<NaiveDate>,
    pub jenis_kelamin: Option<String>,
    pub nama_orang_tua: Option<String>,
    pub no_hp_orang_tua: Option<String>,
    pub status: RecordStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Siswa {
    const COLLECTION: &'static str = "siswa";
    const NOT_FOUND: &'static str = "Siswa tidak ditemukan";
}
