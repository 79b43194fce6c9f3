//! Goalkeeper model.

use serde::{Deserialize, Serialize};

/// A goalkeeper available for hire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goleiro {
    pub id: i64,
    #[serde(rename = "nomecompleto")]
    pub full_name: String,
    #[serde(rename = "whatsapp")]
    pub phone: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "tipo_campo")]
    pub field_type: String,
    /// true = active, false = inactive
    pub status: bool,
    #[serde(rename = "fotoperfil", default)]
    pub photo_url: Option<String>,
    pub rating: f64,
}
