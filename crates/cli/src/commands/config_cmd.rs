//! `nohandcoder config` — Configuration management commands.

use nohandcoder_config::AppConfig;
use std::path::PathBuf;

use super::load_config;

pub async fn init(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if config_path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("  Wrote {}", config_path.display());
    println!("  Set `api_key` there, or export NOHANDCODER_API_KEY / OPENAI_API_KEY.");
    Ok(())
}

pub async fn show(workspace: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(workspace)?;
    println!("{}", redacted_toml(&config)?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

fn redacted_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("***".into());
    }
    toml::to_string_pretty(&shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        let path = AppConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains("config.toml"));
    }

    #[test]
    fn show_never_prints_the_key() {
        let config = AppConfig {
            api_key: Some("sk-secret-value".into()),
            ..AppConfig::default()
        };
        let rendered = redacted_toml(&config).unwrap();
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("***"));
        assert!(rendered.contains("model"));
    }
}
