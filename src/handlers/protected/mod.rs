// handlers/protected/mod.rs - Handlers behind `jwt_auth_middleware`
//
// Every handler here may take `Extension<AuthUser>`; the middleware has
// already rejected requests without a valid bearer token.

pub mod auth;
pub mod guru;
pub mod jurnal;
pub mod siswa;
