//! Persisted browse preferences (search text, genre selector, sort key).
//!
//! Values live in a plain string key/value store. They are read once at
//! startup and written back every time the user changes one.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::catalog::{GENRES, Podcast};
use crate::view::{self, ALL_GENRES, CatalogView, SortKey};

pub const KEY_SEARCH: &str = "search";
pub const KEY_SELECTED_GENRE: &str = "selectedGenre";
pub const KEY_SORT_BY: &str = "sortBy";

pub const DEFAULT_SEARCH: &str = "";
pub const DEFAULT_GENRE: &str = ALL_GENRES;
pub const DEFAULT_SORT: &str = "recent";

/// A string key/value store for preferences.
pub trait PrefStore {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<T: PrefStore + ?Sized> PrefStore for Box<T> {
  fn get(&self, key: &str) -> Option<String> {
    (**self).get(key)
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    (**self).set(key, value)
  }
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryPrefStore {
  values: BTreeMap<String, String>,
}

impl PrefStore for MemoryPrefStore {
  fn get(&self, key: &str) -> Option<String> {
    self.values.get(key).cloned()
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    self.values.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// TOML-backed store. The whole table is rewritten on every `set`.
#[derive(Debug)]
pub struct FilePrefStore {
  path: PathBuf,
  values: BTreeMap<String, String>,
}

impl FilePrefStore {
  /// Open the store at `path`. A missing or unreadable file starts empty.
  pub fn open(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    let values = match std::fs::read_to_string(&path) {
      Ok(content) => match toml::from_str(&content) {
        Ok(values) => values,
        Err(e) => {
          warn!(path = %path.display(), err = %e, "prefs: ignoring malformed preferences file");
          BTreeMap::new()
        }
      },
      Err(_) => BTreeMap::new(),
    };
    Self { path, values }
  }

  /// Open `prefs.toml` in the platform config directory.
  pub fn open_default() -> Result<Self> {
    let dir = crate::config::config_dir().context("Could not determine a config directory")?;
    Ok(Self::open(dir.join("prefs.toml")))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Drop every stored value and remove the backing file.
  pub fn clear(&mut self) -> Result<()> {
    self.values.clear();
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
    }
  }

  fn flush(&self) -> Result<()> {
    if let Some(dir) = self.path.parent() {
      std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let content = toml::to_string(&self.values).context("Failed to serialize preferences")?;
    std::fs::write(&self.path, content).with_context(|| format!("Failed to write {}", self.path.display()))
  }
}

impl PrefStore for FilePrefStore {
  fn get(&self, key: &str) -> Option<String> {
    self.values.get(key).cloned()
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    self.values.insert(key.to_string(), value.to_string());
    self.flush()
  }
}

/// The user-controlled, persisted part of the browse state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPreferences {
  pub search: String,
  pub selected_genre: String,
  pub sort_by: String,
}

impl Default for ViewPreferences {
  fn default() -> Self {
    Self {
      search: DEFAULT_SEARCH.to_string(),
      selected_genre: DEFAULT_GENRE.to_string(),
      sort_by: DEFAULT_SORT.to_string(),
    }
  }
}

impl ViewPreferences {
  /// Read each key, falling back to the default when absent or empty.
  pub fn load(store: &impl PrefStore) -> Self {
    let read =
      |key: &str, fallback: &str| store.get(key).filter(|v| !v.is_empty()).unwrap_or_else(|| fallback.to_string());
    Self {
      search: read(KEY_SEARCH, DEFAULT_SEARCH),
      selected_genre: read(KEY_SELECTED_GENRE, DEFAULT_GENRE),
      sort_by: read(KEY_SORT_BY, DEFAULT_SORT),
    }
  }
}

/// Genre selector values in cycling order: `"all"` followed by every genre id.
pub fn genre_options() -> Vec<String> {
  std::iter::once(ALL_GENRES.to_string()).chain(GENRES.iter().map(|g| g.id.to_string())).collect()
}

/// Step to the neighbouring option, wrapping. Unknown values restart at the first option.
fn cycle<'a>(options: &'a [String], current: &str, forward: bool) -> &'a str {
  let n = options.len();
  let next = match options.iter().position(|o| o == current) {
    Some(i) if forward => (i + 1) % n,
    Some(i) => (i + n - 1) % n,
    None => 0,
  };
  &options[next]
}

/// Preferences, page counter and the store they persist to.
///
/// Any preference change is written through and resets the page to 1.
pub struct Browser<S: PrefStore> {
  prefs: ViewPreferences,
  page: usize,
  store: S,
}

impl<S: PrefStore> Browser<S> {
  pub fn load(store: S) -> Self {
    let prefs = ViewPreferences::load(&store);
    debug!(search = %prefs.search, genre = %prefs.selected_genre, sort = %prefs.sort_by, "prefs: loaded");
    Self { prefs, page: 1, store }
  }

  pub fn prefs(&self) -> &ViewPreferences {
    &self.prefs
  }

  pub fn page(&self) -> usize {
    self.page
  }

  #[cfg(test)]
  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn set_search(&mut self, search: &str) {
    self.prefs.search = search.to_string();
    self.persist(KEY_SEARCH, search);
  }

  pub fn set_genre(&mut self, selector: &str) {
    self.prefs.selected_genre = selector.to_string();
    self.persist(KEY_SELECTED_GENRE, selector);
  }

  pub fn set_sort_by(&mut self, sort_by: &str) {
    self.prefs.sort_by = sort_by.to_string();
    self.persist(KEY_SORT_BY, sort_by);
  }

  pub fn cycle_genre(&mut self, forward: bool) {
    let options = genre_options();
    let next = cycle(&options, &self.prefs.selected_genre, forward).to_string();
    self.set_genre(&next);
  }

  pub fn cycle_sort(&mut self, forward: bool) {
    let options: Vec<String> = SortKey::ALL.iter().map(|k| k.key().to_string()).collect();
    let next = cycle(&options, &self.prefs.sort_by, forward).to_string();
    self.set_sort_by(&next);
  }

  /// Reveal one more page.
  pub fn load_more(&mut self) {
    self.page = self.page.saturating_add(1);
  }

  pub fn view<'a>(&self, podcasts: &'a [Podcast]) -> CatalogView<'a> {
    view::derive_view(podcasts, &self.prefs.search, &self.prefs.selected_genre, &self.prefs.sort_by, self.page)
  }

  fn persist(&mut self, key: &str, value: &str) {
    self.page = 1;
    if let Err(e) = self.store.set(key, value) {
      warn!(key, err = %format!("{:#}", e), "prefs: failed to persist preference");
    }
  }
}
