use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "podex")
}

/// Directory holding `config.toml` and `prefs.toml`.
pub fn config_dir() -> Option<PathBuf> {
  project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Directory for the log file.
pub fn data_dir() -> Option<PathBuf> {
  project_dirs().map(|d| d.data_dir().to_path_buf())
}

/// User settings from `config.toml`. Browse preferences live separately in `prefs.toml`.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
  /// Overrides the built-in catalog endpoint.
  pub api_url: Option<String>,
}

impl Config {
  pub fn load() -> Self {
    if let Some(dir) = config_dir() {
      let config_file = dir.join("config.toml");
      if let Ok(content) = std::fs::read_to_string(&config_file) {
        match toml::from_str(&content) {
          Ok(config) => return config,
          Err(e) => warn!(path = %config_file.display(), err = %e, "config: ignoring malformed config file"),
        }
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(config_dir) = config_dir()
      && std::fs::create_dir_all(&config_dir).is_ok()
    {
      let config_file = config_dir.join("config.toml");
      if let Ok(content) = toml::to_string(self)
        && let Err(e) = std::fs::write(&config_file, content)
      {
        warn!(path = %config_file.display(), err = %e, "config: failed to save");
      }
    }
  }

  /// Resolve the catalog URL: CLI flag, then config file, then the built-in default.
  pub fn resolve_api_url(&self, cli: Option<&str>, default: &str) -> String {
    cli
      .or(self.api_url.as_deref())
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .unwrap_or(default)
      .to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_partial_config() {
    let config: Config = toml::from_str("theme_name = \"Mocha\"").unwrap();
    assert_eq!(config.theme_name.as_deref(), Some("Mocha"));
    assert_eq!(config.api_url, None);
  }

  #[test]
  fn api_url_precedence() {
    let config = Config { theme_name: None, api_url: Some("https://file.example".to_string()) };
    assert_eq!(config.resolve_api_url(Some("https://cli.example"), "https://default"), "https://cli.example");
    assert_eq!(config.resolve_api_url(None, "https://default"), "https://file.example");
    assert_eq!(Config::default().resolve_api_url(None, "https://default"), "https://default");
    assert_eq!(Config::default().resolve_api_url(Some("  "), "https://default"), "https://default");
  }
}
