use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Document;
use crate::types::{Kebiasaan, ObjectId};

pub const JURNAL_STATUS_SUBMITTED: &str = "submitted";

/// Daily journal entry for one habit.
///
/// `(siswa_id, tanggal, kebiasaan)` is unique. The student's name, class and
/// major are copied in at creation and never refreshed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurnalEntry {
    pub id: ObjectId,
    pub siswa_id: ObjectId,
    pub nama_siswa: String,
    pub kelas: String,
    pub jurusan: String,
    pub tanggal: NaiveDate,
    pub kebiasaan: Kebiasaan,
    pub aktivitas: String,
    pub refleksi: String,
    pub nilai_karakter: i32,
    pub foto_kegiatan: Option<String>,
    pub catatan_guru: String,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for JurnalEntry {
    const COLLECTION: &'static str = "jurnal_harian";
    const NOT_FOUND: &'static str = "Jurnal tidak ditemukan";
}
