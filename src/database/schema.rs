//! Table and index definitions, applied idempotently at startup.

use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"CREATE TABLE IF NOT EXISTS "users" (
            "id"           TEXT PRIMARY KEY,
            "username"     TEXT NOT NULL,
            "email"        TEXT NOT NULL,
            "password"     TEXT NOT NULL,
            "role"         TEXT NOT NULL,
            "nama_lengkap" TEXT NOT NULL,
            "status"       TEXT NOT NULL,
            "created_at"   TIMESTAMPTZ NOT NULL,
            "updated_at"   TIMESTAMPTZ NOT NULL,
            "last_login"   TIMESTAMPTZ
        )"#,
    ),
    (
        "siswa",
        r#"CREATE TABLE IF NOT EXISTS "siswa" (
            "id"              TEXT PRIMARY KEY,
            "nis"             TEXT NOT NULL,
            "nama_lengkap"    TEXT NOT NULL,
            "kelas"           TEXT NOT NULL,
            "jurusan"         TEXT NOT NULL,
            "email"           TEXT,
            "no_hp"           TEXT,
            "alamat"          TEXT,
            "tanggal_lahir"   TEXT,
            "jenis_kelamin"   TEXT,
            "nama_orang_tua"  TEXT,
            "no_hp_orang_tua" TEXT,
            "status"          TEXT NOT NULL,
            "created_by"      TEXT,
            "created_at"      TIMESTAMPTZ NOT NULL,
            "updated_at"      TIMESTAMPTZ NOT NULL
        )"#,
    ),
    (
        "guru",
        r#"CREATE TABLE IF NOT EXISTS "guru" (
            "id"             TEXT PRIMARY KEY,
            "nip"            TEXT NOT NULL,
            "nama_lengkap"   TEXT NOT NULL,
            "email"          TEXT,
            "no_hp"          TEXT,
            "mata_pelajaran" TEXT,
            "jenis_kelamin"  TEXT,
            "alamat"         TEXT,
            "status"         TEXT NOT NULL,
            "created_by"     TEXT,
            "created_at"     TIMESTAMPTZ NOT NULL,
            "updated_at"     TIMESTAMPTZ NOT NULL
        )"#,
    ),
    (
        "jurnal_harian",
        r#"CREATE TABLE IF NOT EXISTS "jurnal_harian" (
            "id"             TEXT PRIMARY KEY,
            "siswa_id"       TEXT NOT NULL,
            "nama_siswa"     TEXT NOT NULL,
            "kelas"          TEXT NOT NULL,
            "jurusan"        TEXT NOT NULL,
            "tanggal"        TEXT NOT NULL,
            "kebiasaan"      TEXT NOT NULL,
            "aktivitas"      TEXT NOT NULL,
            "refleksi"       TEXT NOT NULL,
            "nilai_karakter" INTEGER NOT NULL,
            "foto_kegiatan"  TEXT,
            "catatan_guru"   TEXT NOT NULL,
            "status"         TEXT NOT NULL,
            "created_by"     TEXT,
            "created_at"     TIMESTAMPTZ NOT NULL,
            "updated_at"     TIMESTAMPTZ NOT NULL
        )"#,
    ),
];

/// Index declaration: table, columns, unique.
pub struct IndexSpec {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
}

impl IndexSpec {
    pub fn name(&self) -> String {
        let suffix = if self.unique { "key" } else { "idx" };
        format!("{}_{}_{}", self.table, self.columns.join("_"), suffix)
    }

    pub fn to_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE {}INDEX IF NOT EXISTS \"{}\" ON \"{}\" ({})",
            if self.unique { "UNIQUE " } else { "" },
            self.name(),
            self.table,
            columns
        )
    }
}

pub const INDEXES: &[IndexSpec] = &[
    IndexSpec { table: "users", columns: &["username"], unique: true },
    IndexSpec { table: "users", columns: &["email"], unique: true },
    IndexSpec { table: "users", columns: &["role"], unique: false },
    IndexSpec { table: "siswa", columns: &["nis"], unique: true },
    IndexSpec { table: "siswa", columns: &["kelas"], unique: false },
    IndexSpec { table: "siswa", columns: &["jurusan"], unique: false },
    IndexSpec { table: "guru", columns: &["nip"], unique: true },
    IndexSpec { table: "guru", columns: &["email"], unique: false },
    IndexSpec { table: "jurnal_harian", columns: &["siswa_id"], unique: false },
    IndexSpec { table: "jurnal_harian", columns: &["tanggal"], unique: false },
    IndexSpec { table: "jurnal_harian", columns: &["kebiasaan"], unique: false },
    IndexSpec { table: "jurnal_harian", columns: &["siswa_id", "tanggal", "kebiasaan"], unique: true },
];

/// Unique column sets declared for `table`.
pub fn unique_keys(table: &str) -> impl Iterator<Item = &'static [&'static str]> + '_ {
    INDEXES
        .iter()
        .filter(move |idx| idx.unique && idx.table == table)
        .map(|idx| idx.columns)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for (table, ddl) in TABLES {
        sqlx::query(ddl).execute(pool).await?;
        info!("Ensured table {}", table);
    }
    for index in INDEXES {
        sqlx::query(&index.to_sql()).execute(pool).await?;
    }
    info!("Ensured {} indexes", INDEXES.len());
    Ok(())
}
