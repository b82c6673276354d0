//! Default wiring for embedders.
//!
//! Builds a `ChatWidget` from the standard collaborators: configuration
//! from `config.toml`, the Gemini agent from `secret.json`, the HTTP remote
//! store connector, and the file-backed backup slot.

use std::sync::Arc;

use banter_core::error::Result;
use banter_core::session::SessionMetadata;
use banter_infrastructure::{JsonBackupRepository, load_default_widget_config};
use banter_interaction::{GeminiApiAgent, HttpStoreConnector};

use crate::widget::ChatWidget;

/// Creates a widget with the default services.
///
/// # Errors
///
/// Returns an error if configuration or secrets cannot be loaded, or the
/// backup slot location cannot be created. The widget itself starts only
/// when the caller invokes [`ChatWidget::start`].
pub async fn bootstrap_widget(metadata: SessionMetadata) -> Result<ChatWidget> {
    let config = load_default_widget_config()?;
    tracing::debug!("[Bootstrap] Loaded widget configuration");

    let agent = GeminiApiAgent::try_from_secrets(&config).await?;
    let backup_repository = Arc::new(JsonBackupRepository::default_location()?);

    Ok(ChatWidget::new(
        config,
        metadata,
        Arc::new(agent),
        Arc::new(HttpStoreConnector),
        backup_repository,
    ))
}
