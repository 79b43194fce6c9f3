//! Match model and the assignment request body.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PartidaStatus {
    Confirmado,
    Pendente,
    Cancelado,
}

impl PartidaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartidaStatus::Confirmado => "confirmado",
            PartidaStatus::Pendente => "pendente",
            PartidaStatus::Cancelado => "cancelado",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "confirmado" => Some(PartidaStatus::Confirmado),
            "pendente" => Some(PartidaStatus::Pendente),
            "cancelado" => Some(PartidaStatus::Cancelado),
            _ => None,
        }
    }
}

/// A scheduled match that needs a goalkeeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partida {
    pub id: i64,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "hora")]
    pub time: String,
    #[serde(rename = "endereco")]
    pub address: String,
    #[serde(rename = "tipocampo")]
    pub field_type: String,
    #[serde(rename = "contratante")]
    pub requested_by: String,
    /// None while nobody is assigned
    #[serde(rename = "idgoleiro")]
    pub goleiro_id: Option<i64>,
    pub status: PartidaStatus,
}

impl Partida {
    /// Apply an assignment: set the goalkeeper and force the match to confirmed.
    pub fn assign(&mut self, goleiro_id: i64) {
        self.goleiro_id = Some(goleiro_id);
        self.status = PartidaStatus::Confirmado;
    }
}

/// Request body for `POST /api/partidas/{id}/assign`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub goleiro_id: i64,
}

impl AssignRequest {
    /// Parse a raw request body.
    ///
    /// `goleiroId` may be a JSON integer, a float without a fractional part,
    /// or a numeric string; zero is rejected.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        let goleiro_id = match value.get("goleiroId")? {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(id) => id,
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)? as i64,
            },
            serde_json::Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };

        (goleiro_id != 0).then_some(Self { goleiro_id })
    }
}
