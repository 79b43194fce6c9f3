//! Data sources the dashboard can read from and mutate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::api::Ack;
use crate::config::ClientConfig;
use crate::models::{AssignRequest, Goleiro, Partida, PartidaStatus};

/// Errors raised while talking to a data source.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend rejected the mutation")]
    Rejected,
}

/// The four operations the dashboard needs from a backend.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn list_goleiros(&self) -> Result<Vec<Goleiro>, ClientError>;
    async fn toggle_goleiro_status(&self, id: i64) -> Result<(), ClientError>;
    async fn list_partidas(&self) -> Result<Vec<Partida>, ClientError>;
    async fn assign_goleiro(&self, partida_id: i64, goleiro_id: i64) -> Result<(), ClientError>;
}

/// Pick the backend named by the client configuration.
pub fn backend_from_config(config: &ClientConfig) -> Arc<dyn DataSource> {
    if config.use_real_api {
        tracing::info!(base_url = %config.api_base_url, "Dashboard using HTTP backend");
        Arc::new(HttpBackend::new(&config.api_base_url))
    } else {
        tracing::info!("Dashboard using fixture data");
        Arc::new(FixtureBackend::new())
    }
}

// ==================== HTTP BACKEND ====================

/// Talks to the `/api` routes of the server.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Backend request failed");
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn expect_ack(response: reqwest::Response) -> Result<(), ClientError> {
        let ack: Ack = Self::check(response).await?.json().await?;
        if ack.ok {
            Ok(())
        } else {
            Err(ClientError::Rejected)
        }
    }
}

#[async_trait]
impl DataSource for HttpBackend {
    async fn list_goleiros(&self) -> Result<Vec<Goleiro>, ClientError> {
        let response = self.client.get(self.url("/goleiros")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn toggle_goleiro_status(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/goleiros/{}/toggle", id)))
            .send()
            .await?;
        Self::expect_ack(response).await
    }

    async fn list_partidas(&self) -> Result<Vec<Partida>, ClientError> {
        let response = self.client.get(self.url("/partidas")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn assign_goleiro(&self, partida_id: i64, goleiro_id: i64) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url(&format!("/partidas/{}/assign", partida_id)))
            .json(&AssignRequest { goleiro_id })
            .send()
            .await?;
        Self::expect_ack(response).await
    }
}

// ==================== FIXTURE BACKEND ====================

#[derive(Debug, Clone)]
struct FixtureData {
    goleiros: Vec<Goleiro>,
    partidas: Vec<Partida>,
}

/// In-memory canned dataset for demonstrations without a database.
///
/// Mutations follow the server statements: toggling an unknown id and
/// assigning to an unknown match are silent no-ops.
pub struct FixtureBackend {
    data: Mutex<FixtureData>,
    delay: Duration,
}

impl Default for FixtureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureBackend {
    pub fn new() -> Self {
        Self::with_data(fixture_goleiros(), fixture_partidas())
    }

    pub fn with_data(goleiros: Vec<Goleiro>, partidas: Vec<Partida>) -> Self {
        Self {
            data: Mutex::new(FixtureData { goleiros, partidas }),
            delay: Duration::ZERO,
        }
    }

    /// Simulate network latency on every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl DataSource for FixtureBackend {
    async fn list_goleiros(&self) -> Result<Vec<Goleiro>, ClientError> {
        self.pause().await;
        Ok(self.data.lock().await.goleiros.clone())
    }

    async fn toggle_goleiro_status(&self, id: i64) -> Result<(), ClientError> {
        self.pause().await;
        let mut data = self.data.lock().await;
        if let Some(goleiro) = data.goleiros.iter_mut().find(|g| g.id == id) {
            goleiro.status = !goleiro.status;
        }
        Ok(())
    }

    async fn list_partidas(&self) -> Result<Vec<Partida>, ClientError> {
        self.pause().await;
        Ok(self.data.lock().await.partidas.clone())
    }

    async fn assign_goleiro(&self, partida_id: i64, goleiro_id: i64) -> Result<(), ClientError> {
        self.pause().await;
        let mut data = self.data.lock().await;
        if let Some(partida) = data.partidas.iter_mut().find(|p| p.id == partida_id) {
            partida.assign(goleiro_id);
        }
        Ok(())
    }
}

fn goleiro(id: i64, name: &str, city: &str, field_type: &str, status: bool, rating: f64) -> Goleiro {
    let seed = name.split_whitespace().next().unwrap_or(name);
    Goleiro {
        id,
        full_name: name.to_string(),
        phone: format!("1199999000{}", id),
        city: city.to_string(),
        field_type: field_type.to_string(),
        status,
        photo_url: Some(format!(
            "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
            seed
        )),
        rating,
    }
}

#[allow(clippy::too_many_arguments)]
fn partida(
    id: i64,
    date: &str,
    time: &str,
    address: &str,
    field_type: &str,
    requested_by: &str,
    goleiro_id: Option<i64>,
    status: PartidaStatus,
) -> Partida {
    Partida {
        id,
        date: date.to_string(),
        time: time.to_string(),
        address: address.to_string(),
        field_type: field_type.to_string(),
        requested_by: requested_by.to_string(),
        goleiro_id,
        status,
    }
}

/// Demonstration goalkeepers.
pub fn fixture_goleiros() -> Vec<Goleiro> {
    vec![
        goleiro(1, "Carlos Muralha", "São Paulo", "Society", true, 4.8),
        goleiro(2, "João 'Mão de Cola'", "Osasco", "Campo", true, 4.5),
        goleiro(3, "Pedro Peneira", "São Paulo", "Futsal", false, 3.2),
        goleiro(4, "Roberto Luva", "Guarulhos", "Society", true, 4.9),
        goleiro(5, "André Seguro", "São Bernardo", "Campo", true, 4.7),
    ]
}

/// Demonstration matches.
pub fn fixture_partidas() -> Vec<Partida> {
    vec![
        partida(101, "2023-10-25", "20:00", "Arena Society, SP", "Society", "Time dos Amigos", Some(1), PartidaStatus::Confirmado),
        partida(102, "2023-10-26", "19:00", "Quadra do Zé, Osasco", "Futsal", "Firma FC", None, PartidaStatus::Pendente),
        partida(103, "2023-10-27", "21:00", "Clube Atlético, SP", "Campo", "Real Matismo", Some(2), PartidaStatus::Confirmado),
        partida(104, "2023-10-28", "10:00", "Arena Play, Guarulhos", "Society", "Domingueiros", Some(4), PartidaStatus::Cancelado),
    ]
}
