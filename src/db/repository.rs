//! Entity statements for goalkeepers and matches.
//!
//! Every mutation is a single statement; there are no transactions.

use sqlx::any::AnyRow;
use sqlx::error::ErrorKind;
use sqlx::Row;

use super::{Database, SqlParam};
use crate::errors::AppError;
use crate::models::{Goleiro, Partida, PartidaStatus};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    db: Database,
}

impl Repository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The underlying data-access handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // ==================== GOLEIRO OPERATIONS ====================

    /// List all goalkeepers in insertion (id) order.
    ///
    /// `status + 0` reads a `BOOLEAN`/`TINYINT(1)` column as a plain integer,
    /// which both drivers decode through `sqlx::Any`.
    pub async fn list_goleiros(&self) -> Result<Vec<Goleiro>, AppError> {
        let rows = self
            .db
            .execute(
                "SELECT id, nomecompleto, whatsapp, cidade, tipo_campo, status + 0 AS status, fotoperfil, rating FROM goleiros ORDER BY id",
                &[],
            )
            .await?;

        let goleiros = rows
            .iter()
            .map(goleiro_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goleiros)
    }

    /// Flip a goalkeeper's active flag in the database.
    ///
    /// Matching zero rows is not an error.
    pub async fn toggle_goleiro_status(&self, id: i64) -> Result<(), AppError> {
        self.db
            .execute(
                "UPDATE goleiros SET status = NOT status WHERE id = ?",
                &[SqlParam::Int(id)],
            )
            .await?;
        Ok(())
    }

    // ==================== PARTIDA OPERATIONS ====================

    /// List all matches in insertion (id) order.
    pub async fn list_partidas(&self) -> Result<Vec<Partida>, AppError> {
        let rows = self
            .db
            .execute(
                "SELECT id, data, hora, endereco, tipocampo, contratante, idgoleiro, status FROM partidas ORDER BY id",
                &[],
            )
            .await?;

        let partidas = rows
            .iter()
            .map(partida_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(partidas)
    }

    /// Assign a goalkeeper to a match and mark it confirmed, whatever its
    /// previous status.
    ///
    /// An unknown goalkeeper is rejected by the foreign key. An unknown match
    /// id matches zero rows and is not an error.
    pub async fn assign_goleiro(&self, partida_id: i64, goleiro_id: i64) -> Result<(), AppError> {
        let result = self
            .db
            .execute(
                "UPDATE partidas SET idgoleiro = ?, status = ? WHERE id = ?",
                &[
                    SqlParam::Int(goleiro_id),
                    SqlParam::Text(PartidaStatus::Confirmado.as_str().to_string()),
                    SqlParam::Int(partida_id),
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if matches!(db_err.kind(), ErrorKind::ForeignKeyViolation) =>
            {
                tracing::warn!(partida_id, goleiro_id, "Assignment to unknown goleiro rejected");
                Err(AppError::NotFound(format!("Goleiro {} not found", goleiro_id)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

// Helper functions for row conversion

fn goleiro_from_row(row: &AnyRow) -> Result<Goleiro, sqlx::Error> {
    let status: i64 = row.try_get("status")?;
    Ok(Goleiro {
        id: row.try_get("id")?,
        full_name: row.try_get("nomecompleto")?,
        phone: row.try_get("whatsapp")?,
        city: row.try_get("cidade")?,
        field_type: row.try_get("tipo_campo")?,
        status: status != 0,
        photo_url: row.try_get("fotoperfil")?,
        rating: row.try_get("rating")?,
    })
}

fn partida_from_row(row: &AnyRow) -> Result<Partida, sqlx::Error> {
    let status_str: String = row.try_get("status")?;
    let status = PartidaStatus::from_str(&status_str).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: format!("unknown partida status {:?}", status_str).into(),
    })?;

    Ok(Partida {
        id: row.try_get("id")?,
        date: row.try_get("data")?,
        time: row.try_get("hora")?,
        address: row.try_get("endereco")?,
        field_type: row.try_get("tipocampo")?,
        requested_by: row.try_get("contratante")?,
        goleiro_id: row.try_get("idgoleiro")?,
        status,
    })
}
