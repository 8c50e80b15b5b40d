use sqlx::PgPool;

/// Shared handler state. The pool handle is threaded through every request
/// scope explicitly rather than living in a process global.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}
