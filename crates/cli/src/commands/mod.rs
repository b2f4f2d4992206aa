//! Subcommand implementations and the wiring they share.

pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod tools;

use nohandcoder_agent::{AgentStreamEvent, Session};
use nohandcoder_config::AppConfig;
use nohandcoder_core::event::EventBus;
use nohandcoder_tools::Workspace;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Load the config and apply the `--workspace` override.
pub fn load_config(workspace: Option<PathBuf>) -> CliResult<AppConfig> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if workspace.is_some() {
        config.workspace.root = workspace;
    }
    Ok(config)
}

pub fn workspace_for(config: &AppConfig) -> Workspace {
    Workspace::new(config.workspace_root()).with_ignored_dirs(config.workspace.ignored_dirs.clone())
}

/// Wire provider, tools and agent into a session.
pub fn build_session(config: &AppConfig) -> CliResult<Session> {
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    NOHANDCODER_API_KEY=sk-...");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add `api_key` to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = nohandcoder_providers::build_from_config(config)?;
    let tools = nohandcoder_tools::default_registry(
        workspace_for(config),
        Duration::from_secs(config.command.timeout_secs),
    );

    tracing::debug!(
        model = %config.model,
        api_url = %config.api_url,
        workspace = %config.workspace_root().display(),
        "Session configured"
    );
    Ok(Session::from_config(
        config,
        Arc::new(provider),
        Arc::new(tools),
        Arc::new(EventBus::default()),
    ))
}

/// Render streaming events: answer text on stdout, tool activity on stderr.
pub fn render_event(event: &AgentStreamEvent) {
    match event {
        AgentStreamEvent::Chunk { content } => {
            print!("{content}");
            let _ = std::io::stdout().flush();
        }
        AgentStreamEvent::ToolCall {
            name, arguments, ..
        } => {
            eprintln!("  [tool] {name} {arguments}");
        }
        AgentStreamEvent::ToolResult { name, success, .. } => {
            let status = if *success { "ok" } else { "failed" };
            eprintln!("  [tool] {name} {status}");
        }
        AgentStreamEvent::Done { .. } => println!(),
        AgentStreamEvent::Error { .. } => {}
    }
}

/// Print a turn failure, and whether it is worth retrying.
pub fn report_turn_error(error: &nohandcoder_core::Error) {
    eprintln!("  [error] {error}");
    eprintln!("  {}", retry_hint(error));
}

fn retry_hint(error: &nohandcoder_core::Error) -> &'static str {
    if error.is_retryable() {
        "Your conversation is unchanged; you can send the same request again."
    } else {
        "Your conversation is unchanged; fix the problem above before retrying."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nohandcoder_core::{Error, ProviderError};

    #[test]
    fn retry_hint_follows_retryability() {
        let rate_limited = Error::Provider(ProviderError::RateLimited {
            retry_after_secs: 2,
        });
        assert!(retry_hint(&rate_limited).contains("send the same request again"));

        let bad_key = Error::Provider(ProviderError::AuthenticationFailed("bad key".into()));
        assert!(retry_hint(&bad_key).contains("fix the problem"));
        assert!(!bad_key.to_string().contains("retry"));
    }
}
