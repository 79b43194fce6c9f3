//! Data-access layer.
//!
//! The relational database is the source of truth; this module owns the
//! connection pool and the single "run a parameterized statement" primitive
//! everything else is built on.

mod diagnostics;
mod repository;

pub use diagnostics::*;
pub use repository::*;

use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{Any, AnyPool};

/// Upper bound on pooled connections for the whole process.
pub const POOL_MAX_CONNECTIONS: u32 = 6;

/// Scalar value bound positionally to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        SqlParam::Float(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlParam::Null)
    }
}

/// Bounded connection pool handed to the handlers at startup.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Execute a parameterized statement and return its result rows.
    ///
    /// Statements that produce no rows return an empty vector. Driver errors
    /// are returned unchanged.
    pub async fn execute(
        &self,
        statement: &str,
        params: &[SqlParam],
    ) -> Result<Vec<AnyRow>, sqlx::Error> {
        tracing::debug!(statement, params = params.len(), "Executing statement");

        let mut query = sqlx::query::<Any>(statement);
        for param in params {
            query = match param {
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::Float(v) => query.bind(*v),
                SqlParam::Text(v) => query.bind(v.clone()),
                SqlParam::Null => query.bind(None::<i64>),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        tracing::debug!(rows = rows.len(), "Statement finished");
        Ok(rows)
    }
}

/// Build the connection pool and run migrations.
///
/// `url` selects the driver: `mysql://` in production, `sqlite:` for local
/// runs and tests.
pub async fn init_database(url: &str) -> Result<Database, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(POOL_MAX_CONNECTIONS)
        .connect(url)
        .await?;

    let database = Database::new(pool);
    run_migrations(&database).await?;

    Ok(database)
}

/// Schema statements, one per call so MySQL accepts them.
///
/// The types are restricted to what both drivers decode through `sqlx::Any`.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS goleiros (
        id INTEGER PRIMARY KEY,
        nomecompleto VARCHAR(255) NOT NULL,
        whatsapp VARCHAR(32) NOT NULL DEFAULT '',
        cidade VARCHAR(128) NOT NULL DEFAULT '',
        tipo_campo VARCHAR(32) NOT NULL DEFAULT '',
        status INTEGER NOT NULL DEFAULT 1,
        fotoperfil VARCHAR(512),
        rating DOUBLE NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS partidas (
        id INTEGER PRIMARY KEY,
        data VARCHAR(10) NOT NULL,
        hora VARCHAR(5) NOT NULL,
        endereco VARCHAR(255) NOT NULL,
        tipocampo VARCHAR(32) NOT NULL,
        contratante VARCHAR(255) NOT NULL,
        idgoleiro INTEGER,
        status VARCHAR(16) NOT NULL DEFAULT 'pendente',
        FOREIGN KEY (idgoleiro) REFERENCES goleiros(id),
        CONSTRAINT chk_partidas_status CHECK (status IN ('confirmado', 'pendente', 'cancelado')),
        CONSTRAINT chk_partidas_confirmado CHECK (status <> 'confirmado' OR idgoleiro IS NOT NULL)
    )
    "#,
];

/// Run database migrations.
async fn run_migrations(database: &Database) -> Result<(), sqlx::Error> {
    for statement in MIGRATIONS {
        database.execute(statement, &[]).await?;
    }

    tracing::info!("Database schema ready");
    Ok(())
}
