pub mod auth;
pub mod jurnal;
pub mod server;
pub mod siswa;
