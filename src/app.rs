use anyhow::Result;
use ratatui::widgets::ListState;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::catalog::Podcast;
use crate::config::Config;
use crate::constants::constants;
use crate::prefs::{Browser, PrefStore};
use crate::theme::{THEMES, Theme};
use crate::view::CatalogView;

pub type CatalogResult = Result<Vec<Podcast>>;

/// Where the one-shot catalog fetch stands.
#[derive(Debug)]
pub enum LoadState {
  Loading,
  Error(String),
  Ready(Vec<Podcast>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  /// Browsing the podcast list.
  List,
  /// Typing into the search box.
  Search,
}

/// One row of the podcast list. The trailing "load more" row only exists while more podcasts are hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
  Podcast(usize),
  LoadMore,
}

pub struct App {
  pub load_state: LoadState,
  pub browser: Browser<Box<dyn PrefStore>>,
  pub focus: Focus,
  /// Search box contents, mirrored into the persisted `search` preference on every edit.
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub list_state: ListState,
  pub theme_index: usize,
  pub config: Config,
  pub should_quit: bool,
  /// Short-lived notice shown in the status line.
  pub notice: Option<String>,
  notice_time: Option<Instant>,
  fetch_rx: Option<oneshot::Receiver<CatalogResult>>,
  fetch_started: bool,
  pub started_at: Instant,
}

impl App {
  pub fn new(browser: Browser<Box<dyn PrefStore>>, config: Config) -> Self {
    let theme_index = crate::theme::theme_index(config.theme_name.as_deref());
    let input = browser.prefs().search.clone();
    let cursor_position = input.chars().count();

    Self {
      load_state: LoadState::Loading,
      browser,
      focus: Focus::List,
      input,
      cursor_position,
      input_scroll: 0,
      list_state: ListState::default().with_selected(Some(0)),
      theme_index,
      config,
      should_quit: false,
      notice: None,
      notice_time: None,
      fetch_rx: None,
      fetch_started: false,
      started_at: Instant::now(),
    }
  }

  pub fn theme(&self) -> &'static Theme {
    &THEMES[self.theme_index % THEMES.len()]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
    self.set_notice(format!("Theme: {}", self.theme().name));
  }

  pub fn set_notice(&mut self, msg: String) {
    self.notice = Some(msg);
    self.notice_time = Some(Instant::now());
  }

  /// Clear the notice once it has been on screen long enough.
  pub fn expire_notice(&mut self) {
    if let Some(t) = self.notice_time
      && t.elapsed() >= Duration::from_secs(constants().notice_dismiss_secs)
    {
      self.notice = None;
      self.notice_time = None;
    }
  }

  // --- Catalog fetch ---

  /// Spawn the catalog fetch. Only the first call does anything.
  pub fn start_fetch(&mut self, client: Client, url: String) {
    if self.fetch_started {
      return;
    }
    self.fetch_started = true;
    info!(url = %url, "fetch: starting catalog fetch");

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(crate::api::fetch_podcasts(&client, &url).await);
    });
    self.fetch_rx = Some(rx);
  }

  /// Poll the in-flight fetch without blocking.
  pub fn check_pending(&mut self) {
    let Some(mut rx) = self.fetch_rx.take() else { return };
    match rx.try_recv() {
      Ok(result) => self.finish_fetch(result),
      Err(oneshot::error::TryRecvError::Empty) => {
        self.fetch_rx = Some(rx);
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        warn!("fetch: task ended without a result");
        self.finish_fetch(Err(anyhow::anyhow!("fetch task failed")));
      }
    }
  }

  /// Apply the fetch outcome. Only a `Loading` state transitions.
  pub fn finish_fetch(&mut self, result: CatalogResult) {
    if !self.is_loading() {
      return;
    }
    self.load_state = match result {
      Ok(podcasts) => {
        info!(count = podcasts.len(), "fetch: ready");
        LoadState::Ready(podcasts)
      }
      Err(e) => {
        let message = format!("{:#}", e);
        warn!(err = %message, "fetch: failed");
        LoadState::Error(message)
      }
    };
    self.clamp_selection();
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.load_state, LoadState::Loading)
  }

  // --- Derived view ---

  /// The visible slice. `None` until the catalog is ready.
  pub fn view(&self) -> Option<CatalogView<'_>> {
    match &self.load_state {
      LoadState::Ready(podcasts) => Some(self.browser.view(podcasts)),
      _ => None,
    }
  }

  pub fn rows(&self) -> Vec<Row> {
    let Some(view) = self.view() else { return Vec::new() };
    let mut rows: Vec<Row> = (0..view.visible.len()).map(Row::Podcast).collect();
    if view.has_more {
      rows.push(Row::LoadMore);
    }
    rows
  }

  pub fn selected_row(&self) -> Option<Row> {
    let selected = self.list_state.selected()?;
    self.rows().get(selected).copied()
  }

  pub fn selected_podcast(&self) -> Option<&Podcast> {
    let Row::Podcast(idx) = self.selected_row()? else { return None };
    let LoadState::Ready(podcasts) = &self.load_state else { return None };
    self.browser.view(podcasts).visible.get(idx).copied()
  }

  pub fn select_next(&mut self) {
    let count = self.rows().len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
      self.list_state.select(Some(i));
    }
  }

  pub fn select_previous(&mut self) {
    let count = self.rows().len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.list_state.select(Some(i));
    }
  }

  pub fn select_first(&mut self) {
    if !self.rows().is_empty() {
      self.list_state.select(Some(0));
    }
  }

  pub fn select_last(&mut self) {
    let count = self.rows().len();
    if count > 0 {
      self.list_state.select(Some(count - 1));
    }
  }

  fn clamp_selection(&mut self) {
    let count = self.rows().len();
    if count == 0 {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0).min(count - 1);
      self.list_state.select(Some(sel));
    }
  }

  /// Preference changes reset paging, so selection goes back to the top.
  fn reset_selection(&mut self) {
    self.list_state.select(Some(0));
    *self.list_state.offset_mut() = 0;
    self.clamp_selection();
  }

  // --- User actions ---

  /// Push the search box contents into the preferences.
  pub fn commit_search_input(&mut self) {
    if self.browser.prefs().search == self.input {
      return;
    }
    let input = self.input.clone();
    self.browser.set_search(&input);
    self.reset_selection();
  }

  pub fn clear_search(&mut self) {
    self.input.clear();
    self.cursor_position = 0;
    self.input_scroll = 0;
    self.commit_search_input();
  }

  pub fn cycle_genre(&mut self, forward: bool) {
    self.browser.cycle_genre(forward);
    self.reset_selection();
  }

  pub fn cycle_sort(&mut self, forward: bool) {
    self.browser.cycle_sort(forward);
    self.reset_selection();
  }

  /// Reveal the next page, keeping the cursor on the first newly shown podcast.
  pub fn load_more(&mut self) {
    let Some(first_new) = self.view().filter(|v| v.has_more).map(|v| v.visible.len()) else { return };
    self.browser.load_more();
    self.list_state.select(Some(first_new));
    self.clamp_selection();
  }

  /// Enter on a row: the "load more" row loads more, a podcast row does nothing extra.
  pub fn activate_selected(&mut self) {
    if self.selected_row() == Some(Row::LoadMore) {
      self.load_more();
    }
  }

  /// Frame index for the loading spinner.
  pub fn spinner_frame(&self) -> usize {
    (self.started_at.elapsed().as_millis() / 100) as usize
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::prefs::{KEY_SEARCH, KEY_SORT_BY, MemoryPrefStore};

  fn podcast(id: &str, title: &str, genres: &[i64], updated: &str) -> Podcast {
    Podcast {
      id: id.to_string(),
      title: title.to_string(),
      description: None,
      image: None,
      genres: genres.to_vec(),
      updated: updated.to_string(),
      seasons: None,
    }
  }

  fn catalog(n: usize) -> Vec<Podcast> {
    (0..n).map(|i| podcast(&format!("{:02}", i), &format!("Show {:02}", i), &[1], "2024-01-01")).collect()
  }

  fn app_with(store: MemoryPrefStore) -> App {
    let store: Box<dyn PrefStore> = Box::new(store);
    App::new(Browser::load(store), Config::default())
  }

  fn app() -> App {
    app_with(MemoryPrefStore::default())
  }

  #[test]
  fn starts_loading_with_no_rows() {
    let app = app();
    assert!(app.is_loading());
    assert!(app.view().is_none());
    assert!(app.rows().is_empty());
  }

  #[test]
  fn fetch_success_becomes_ready() {
    let mut app = app();
    app.finish_fetch(Ok(catalog(3)));
    assert!(matches!(app.load_state, LoadState::Ready(ref p) if p.len() == 3));
    assert_eq!(app.view().unwrap().visible.len(), 3);
  }

  #[test]
  fn fetch_failure_becomes_error_and_suppresses_view() {
    let mut app = app();
    app.finish_fetch(Err(anyhow::anyhow!("HTTP 500")));
    assert!(matches!(app.load_state, LoadState::Error(ref m) if m == "HTTP 500"));
    assert!(app.view().is_none());
    assert!(app.rows().is_empty());
    assert_eq!(app.list_state.selected(), None);
  }

  #[test]
  fn only_the_first_outcome_counts() {
    let mut app = app();
    app.finish_fetch(Ok(catalog(2)));
    app.finish_fetch(Err(anyhow::anyhow!("late")));
    assert!(matches!(app.load_state, LoadState::Ready(_)));
  }

  #[test]
  fn check_pending_delivers_result_once() {
    let mut app = app();
    let (tx, rx) = oneshot::channel();
    app.fetch_rx = Some(rx);

    app.check_pending();
    assert!(app.is_loading());

    tx.send(Ok(catalog(1))).unwrap();
    app.check_pending();
    assert!(matches!(app.load_state, LoadState::Ready(_)));
    assert!(app.fetch_rx.is_none());
  }

  #[test]
  fn dropped_sender_is_an_error() {
    let mut app = app();
    let (tx, rx) = oneshot::channel::<CatalogResult>();
    app.fetch_rx = Some(rx);
    drop(tx);
    app.check_pending();
    assert!(matches!(app.load_state, LoadState::Error(ref m) if m == "fetch task failed"));
  }

  #[test]
  fn load_more_row_only_when_more_remain() {
    let mut app = app();
    app.finish_fetch(Ok(catalog(10)));
    let rows = app.rows();
    assert_eq!(rows.len(), 9);
    assert_eq!(rows.last(), Some(&Row::LoadMore));

    app.select_last();
    app.activate_selected();
    assert_eq!(app.browser.page(), 2);
    assert_eq!(app.rows().len(), 10);
    assert!(!app.rows().contains(&Row::LoadMore));
    assert_eq!(app.selected_row(), Some(Row::Podcast(8)));
    assert_eq!(app.selected_podcast().unwrap().title, "Show 08");

    app.load_more();
    assert_eq!(app.browser.page(), 2);
  }

  #[test]
  fn search_edit_persists_and_resets_page() {
    let mut app = app();
    app.finish_fetch(Ok(catalog(20)));
    app.load_more();
    assert_eq!(app.browser.page(), 2);

    app.input = "show 1".to_string();
    app.commit_search_input();
    assert_eq!(app.browser.page(), 1);
    assert_eq!(app.browser.store().get(KEY_SEARCH).as_deref(), Some("show 1"));
    assert_eq!(app.view().unwrap().total, 10);
    assert_eq!(app.list_state.selected(), Some(0));
  }

  #[test]
  fn persisted_search_seeds_the_input() {
    let mut store = MemoryPrefStore::default();
    store.set(KEY_SEARCH, "crime").unwrap();
    let app = app_with(store);
    assert_eq!(app.input, "crime");
    assert_eq!(app.cursor_position, 5);
  }

  #[test]
  fn sort_cycle_persists() {
    let mut app = app();
    app.finish_fetch(Ok(catalog(3)));
    app.cycle_sort(true);
    assert_eq!(app.browser.store().get(KEY_SORT_BY).as_deref(), Some("popular"));
  }

  #[test]
  fn genre_filter_with_no_matches_clears_selection() {
    let mut app = app();
    app.finish_fetch(Ok(catalog(3)));
    app.cycle_genre(true);
    app.cycle_genre(true);
    assert_eq!(app.browser.prefs().selected_genre, "2");
    assert!(app.rows().is_empty());
    assert_eq!(app.list_state.selected(), None);
    app.select_next();
    assert_eq!(app.list_state.selected(), None);
  }

  #[test]
  fn selection_wraps() {
    let mut app = app();
    app.finish_fetch(Ok(catalog(3)));
    app.select_previous();
    assert_eq!(app.list_state.selected(), Some(2));
    app.select_next();
    assert_eq!(app.list_state.selected(), Some(0));
  }

  #[test]
  fn notice_expires_after_dismiss_window() {
    let mut app = app();
    app.set_notice("Theme: Latte".to_string());
    app.expire_notice();
    assert_eq!(app.notice.as_deref(), Some("Theme: Latte"));

    let window = Duration::from_secs(constants().notice_dismiss_secs + 1);
    app.notice_time = Instant::now().checked_sub(window);
    app.expire_notice();
    assert!(app.notice.is_none());
  }
}
