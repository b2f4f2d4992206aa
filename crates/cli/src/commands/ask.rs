//! `nohandcoder ask` — single-turn mode.

use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use super::{build_session, load_config, render_event, report_turn_error};

pub async fn run(workspace: Option<PathBuf>, message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(workspace)?;
    let mut session = build_session(&config)?;

    let cancel = CancellationToken::new();
    let watcher = super::chat::cancel_on_ctrl_c(cancel.clone());

    let result = session
        .handle_user_input_with_cancel(&message, Some(&render_event), &cancel)
        .await;
    watcher.abort();

    if let Err(e) = result {
        report_turn_error(&e);
        return Err(e.into());
    }
    Ok(())
}
