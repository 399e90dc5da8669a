//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` and parsed once on first access.

use serde::Deserialize;
use std::sync::LazyLock;

#[derive(Debug, Deserialize)]
pub struct Constants {
  /// Catalog endpoint used when neither the CLI nor `config.toml` sets one.
  pub api_url: String,
  pub request_timeout_secs: u64,
  /// How long a status-line notice stays on screen.
  pub notice_dismiss_secs: u64,
  pub log_file_name: String,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Embedded at build time, so a malformed file fails on first access in any test run.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

pub fn constants() -> &'static Constants {
  &CONSTANTS
}
