//! WhatsApp confirmation drafts produced by an external text generator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{Goleiro, Partida};

/// Shown when the generator answers with no text.
pub const EMPTY_RESPONSE_TEXT: &str = "Sem resposta.";
/// Shown when no API key is configured.
pub const MISSING_KEY_TEXT: &str =
    "⚠️ Configure a API Key do Gemini (GEMINI_API_KEY) para gerar mensagens.";
/// Shown when the generator call fails.
pub const GENERATION_ERROR_TEXT: &str = "Erro ao gerar mensagem. Verifique sua conexão.";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),
    #[error("provider error: {0}")]
    Provider(String),
}

/// Opaque text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Render the confirmation prompt for a match.
///
/// Falls back to "Goleiro" when nobody (or an unknown id) is assigned.
pub fn message_prompt(partida: &Partida, goleiro: Option<&Goleiro>) -> String {
    let name = goleiro.map(|g| g.full_name.as_str()).unwrap_or("Goleiro");

    format!(
        "Aja como um gerente de um aplicativo de aluguel de goleiros chamado \"Goleiro Manager\".\n\
         Escreva uma mensagem curta, profissional e motivadora para WhatsApp.\n\
         Destinatário: Goleiro {name}.\n\
         Assunto: Confirmação de Partida.\n\
         Detalhes:\n\
         - Data: {date} às {time}\n\
         - Local: {address}\n\
         - Tipo: {field_type}\n\
         - Contratante: {requested_by}\n\
         \n\
         A mensagem deve confirmar a escalação dele e pedir que chegue 15 minutos antes. Use emojis de futebol.",
        name = name,
        date = partida.date,
        time = partida.time,
        address = partida.address,
        field_type = partida.field_type,
        requested_by = partida.requested_by,
    )
}

// ==================== GEMINI CLIENT ====================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate; empty when there is none.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

/// `generateContent` client for Google's Gemini API.
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_endpoint(GEMINI_ENDPOINT.to_string(), api_key, model)
    }

    pub fn with_endpoint(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Provider(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Provider(format!("Failed to parse response: {}", e)))?;

        Ok(parsed.text())
    }
}
