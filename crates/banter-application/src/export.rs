//! Transcript export.
//!
//! Serializes a session snapshot to a pretty-printed JSON artifact named by
//! its session id. Pure side effect; the live session is never touched.

use std::path::{Path, PathBuf};

use banter_core::error::Result;
use banter_core::session::Session;

/// File name of the exported artifact for a session.
pub fn export_file_name(session_id: &str) -> String {
    format!("chat_history_{}.json", session_id)
}

/// Renders the downloadable artifact.
pub fn export_json(session: &Session) -> Result<String> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// Writes the artifact into `dir`, creating it if needed.
///
/// # Returns
///
/// The path of the written file.
pub async fn export_to_file(session: &Session, dir: &Path) -> Result<PathBuf> {
    let json = export_json(session)?;
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(export_file_name(&session.session_id));
    tokio::fs::write(&path, json).await?;

    tracing::info!("[Export] Wrote transcript to {}", path.display());
    Ok(path)
}
