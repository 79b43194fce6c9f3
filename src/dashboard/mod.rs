//! Dashboard client state.
//!
//! Holds the cached collections, the active view and the two modal dialogs.
//! Mutations go through a [`DataSource`] first and then patch the cache in
//! place; nothing is re-fetched until [`Dashboard::refresh`] is called.

mod backend;
mod message;

pub use backend::*;
pub use message::*;

use std::sync::Arc;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::models::{Goleiro, Partida, PartidaStatus};

/// Fee earned per confirmed match.
pub const FEE_PER_CONFIRMED_MATCH: u32 = 80;

/// Number of matches listed under "recent" on the summary view.
const RECENT_MATCHES: usize = 3;

/// Top-level views, selected by tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Goleiros,
    Partidas,
}

/// Reassignment dialog for one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapModal {
    pub partida_id: i64,
    pub selected_goleiro_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageState {
    Generating,
    /// Text returned by the generator, ready to copy
    Drafted(String),
    /// Fallback text explaining why there is no draft
    Unavailable(String),
}

impl MessageState {
    pub fn text(&self) -> &str {
        match self {
            MessageState::Generating => "",
            MessageState::Drafted(text) | MessageState::Unavailable(text) => text.as_str(),
        }
    }
}

/// Message-draft dialog for one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageModal {
    pub partida_id: i64,
    pub state: MessageState,
}

/// Figures shown on the dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_partidas: usize,
    pub confirmadas: usize,
    pub goleiros_ativos: usize,
    pub receita: u32,
    pub recentes: Vec<Partida>,
}

pub struct Dashboard {
    source: Arc<dyn DataSource>,
    generator: Option<Arc<dyn TextGenerator>>,
    view: View,
    goleiros: Vec<Goleiro>,
    partidas: Vec<Partida>,
    is_loading: bool,
    is_updating: bool,
    swap_modal: Option<SwapModal>,
    message_modal: Option<MessageModal>,
    last_error: Option<String>,
}

impl Dashboard {
    /// A dashboard that has not loaded yet; views stay gated until [`load`](Self::load).
    pub fn new(source: Arc<dyn DataSource>, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            source,
            generator,
            view: View::default(),
            goleiros: Vec::new(),
            partidas: Vec::new(),
            is_loading: true,
            is_updating: false,
            swap_modal: None,
            message_modal: None,
            last_error: None,
        }
    }

    /// Wire the backend and the message generator from configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        let generator = config.gemini_api_key.as_ref().map(|key| {
            Arc::new(GeminiClient::new(key.clone(), config.gemini_model.clone()))
                as Arc<dyn TextGenerator>
        });
        if generator.is_none() {
            tracing::warn!("No GEMINI_API_KEY configured; message drafting disabled");
        }

        Self::new(backend_from_config(config), generator)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn goleiros(&self) -> &[Goleiro] {
        &self.goleiros
    }

    pub fn partidas(&self) -> &[Partida] {
        &self.partidas
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn swap_modal(&self) -> Option<&SwapModal> {
        self.swap_modal.as_ref()
    }

    pub fn message_modal(&self) -> Option<&MessageModal> {
        self.message_modal.as_ref()
    }

    // ==================== LOADING ====================

    /// Fetch both collections concurrently.
    ///
    /// On failure the cached collections are left as they were and the error
    /// is recorded; no fixture data is substituted.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.is_loading = true;

        let result = tokio::try_join!(self.source.list_goleiros(), self.source.list_partidas());
        self.is_loading = false;

        match result {
            Ok((goleiros, partidas)) => {
                tracing::debug!(
                    goleiros = goleiros.len(),
                    partidas = partidas.len(),
                    "Dashboard data loaded"
                );
                self.goleiros = goleiros;
                self.partidas = partidas;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load dashboard data: {}", e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Re-fetch everything, discarding local patches.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.load().await
    }

    // ==================== GOLEIROS ====================

    /// Toggle a goalkeeper's status, then flip the cached copy.
    pub async fn toggle_goleiro(&mut self, id: i64) -> Result<(), ClientError> {
        self.is_updating = true;
        let result = self.source.toggle_goleiro_status(id).await;
        self.is_updating = false;

        if let Err(e) = result {
            tracing::error!(goleiro_id = id, "Failed to toggle goleiro: {}", e);
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        if let Some(goleiro) = self.goleiros.iter_mut().find(|g| g.id == id) {
            goleiro.status = !goleiro.status;
        }
        Ok(())
    }

    /// The goalkeeper assigned to a match, if loaded.
    pub fn assigned_goleiro(&self, partida: &Partida) -> Option<&Goleiro> {
        partida
            .goleiro_id
            .and_then(|id| self.goleiros.iter().find(|g| g.id == id))
    }

    // ==================== SWAP MODAL ====================

    /// Open the reassignment dialog. Returns false for an unknown match.
    pub fn open_swap_modal(&mut self, partida_id: i64) -> bool {
        if !self.partidas.iter().any(|p| p.id == partida_id) {
            return false;
        }

        self.swap_modal = Some(SwapModal {
            partida_id,
            selected_goleiro_id: None,
        });
        true
    }

    /// Goalkeepers offered in the reassignment dialog: active ones only.
    pub fn swap_candidates(&self) -> Vec<&Goleiro> {
        self.goleiros.iter().filter(|g| g.status).collect()
    }

    /// Select a goalkeeper in the open dialog. Inactive or unknown ids are refused.
    pub fn select_swap_goleiro(&mut self, goleiro_id: i64) -> bool {
        let is_candidate = self
            .goleiros
            .iter()
            .any(|g| g.id == goleiro_id && g.status);

        match self.swap_modal.as_mut() {
            Some(modal) if is_candidate => {
                modal.selected_goleiro_id = Some(goleiro_id);
                true
            }
            _ => false,
        }
    }

    pub fn can_confirm_swap(&self) -> bool {
        !self.is_updating
            && self
                .swap_modal
                .as_ref()
                .is_some_and(|m| m.selected_goleiro_id.is_some())
    }

    /// Assign the selected goalkeeper, patch the cached match and close the dialog.
    ///
    /// Returns `Ok(false)` when the dialog is closed or nothing is selected.
    /// On error the dialog stays open.
    pub async fn confirm_swap(&mut self) -> Result<bool, ClientError> {
        let Some(SwapModal {
            partida_id,
            selected_goleiro_id: Some(goleiro_id),
        }) = self.swap_modal.clone()
        else {
            return Ok(false);
        };

        self.is_updating = true;
        let result = self.source.assign_goleiro(partida_id, goleiro_id).await;
        self.is_updating = false;

        if let Err(e) = result {
            tracing::error!(partida_id, goleiro_id, "Failed to assign goleiro: {}", e);
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        if let Some(partida) = self.partidas.iter_mut().find(|p| p.id == partida_id) {
            partida.assign(goleiro_id);
        }
        self.swap_modal = None;
        Ok(true)
    }

    pub fn close_swap_modal(&mut self) {
        self.swap_modal = None;
    }

    // ==================== MESSAGE MODAL ====================

    /// Open the message dialog and draft a confirmation for the match.
    ///
    /// Returns false for an unknown match.
    pub async fn draft_message(&mut self, partida_id: i64) -> bool {
        let Some(partida) = self.partidas.iter().find(|p| p.id == partida_id).cloned() else {
            return false;
        };

        self.message_modal = Some(MessageModal {
            partida_id,
            state: MessageState::Generating,
        });

        let state = match self.generator.clone() {
            None => MessageState::Unavailable(MISSING_KEY_TEXT.to_string()),
            Some(generator) => {
                let prompt = message_prompt(&partida, self.assigned_goleiro(&partida));
                match generator.generate(&prompt).await {
                    Ok(text) if text.trim().is_empty() => {
                        MessageState::Unavailable(EMPTY_RESPONSE_TEXT.to_string())
                    }
                    Ok(text) => MessageState::Drafted(text),
                    Err(e) => {
                        tracing::error!(partida_id, "Message generation failed: {}", e);
                        MessageState::Unavailable(GENERATION_ERROR_TEXT.to_string())
                    }
                }
            }
        };

        if let Some(modal) = self.message_modal.as_mut() {
            modal.state = state;
        }
        true
    }

    /// Only a finished draft can be copied.
    pub fn can_copy_message(&self) -> bool {
        matches!(
            self.message_modal.as_ref().map(|m| &m.state),
            Some(MessageState::Drafted(_))
        )
    }

    /// Take the drafted text for the clipboard and close the dialog.
    pub fn copy_message(&mut self) -> Option<String> {
        if !self.can_copy_message() {
            return None;
        }

        self.message_modal
            .take()
            .map(|modal| modal.state.text().to_string())
    }

    pub fn close_message_modal(&mut self) {
        self.message_modal = None;
    }

    // ==================== SUMMARY ====================

    pub fn summary(&self) -> Summary {
        let confirmadas = self
            .partidas
            .iter()
            .filter(|p| p.status == PartidaStatus::Confirmado)
            .count();

        Summary {
            total_partidas: self.partidas.len(),
            confirmadas,
            goleiros_ativos: self.goleiros.iter().filter(|g| g.status).count(),
            receita: confirmadas as u32 * FEE_PER_CONFIRMED_MATCH,
            recentes: self.partidas.iter().take(RECENT_MATCHES).cloned().collect(),
        }
    }
}
