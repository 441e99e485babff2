use sqlx::PgPool;

/// Shared application state injected into route handlers.
///
/// The pool is built once at startup and cloned per request; there is no
/// ambient global database handle.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}
