use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Focus};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('c') => {
        app.should_quit = true;
        return;
      }
      KeyCode::Char('t') => {
        app.next_theme();
        return;
      }
      KeyCode::Char('u') if app.focus == Focus::Search => {
        app.clear_search();
        return;
      }
      _ => {}
    }
  }

  match app.focus {
    Focus::Search => handle_search_key(app, key),
    Focus::List => handle_list_key(app, key),
  }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
      app.commit_search_input();
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        app.commit_search_input();
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        app.commit_search_input();
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Enter | KeyCode::Esc | KeyCode::Down | KeyCode::Tab => {
      app.focus = Focus::List;
    }
    _ => {}
  }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Char('q') | KeyCode::Esc => {
      app.should_quit = true;
    }
    KeyCode::Char('/') | KeyCode::Tab => {
      app.focus = Focus::Search;
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
    KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
    KeyCode::Home => app.select_first(),
    KeyCode::End => app.select_last(),
    KeyCode::Char('g') => app.cycle_genre(true),
    KeyCode::Char('G') => app.cycle_genre(false),
    KeyCode::Char('s') => app.cycle_sort(true),
    KeyCode::Char('S') => app.cycle_sort(false),
    KeyCode::Char('m') => app.load_more(),
    KeyCode::Enter => app.activate_selected(),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Podcast;
  use crate::config::Config;
  use crate::prefs::{Browser, KEY_SEARCH, MemoryPrefStore, PrefStore};

  fn ready_app() -> App {
    let store: Box<dyn PrefStore> = Box::new(MemoryPrefStore::default());
    let mut app = App::new(Browser::load(store), Config::default());
    let podcasts = (0..12)
      .map(|i| Podcast {
        id: i.to_string(),
        title: format!("Episode {}", i),
        description: None,
        image: None,
        genres: vec![1],
        updated: "2024-01-01".to_string(),
        seasons: None,
      })
      .collect();
    app.finish_fetch(Ok(podcasts));
    app
  }

  fn press(app: &mut App, code: KeyCode) {
    handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5);
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日";
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6);
  }

  // --- key handling ---

  #[test]
  fn typing_in_search_persists_each_keystroke() {
    let mut app = ready_app();
    press(&mut app, KeyCode::Char('/'));
    assert_eq!(app.focus, Focus::Search);
    press(&mut app, KeyCode::Char('1'));
    assert_eq!(app.browser.store().get(KEY_SEARCH).as_deref(), Some("1"));
    press(&mut app, KeyCode::Char('1'));
    assert_eq!(app.input, "11");
    assert_eq!(app.view().unwrap().total, 1);

    press(&mut app, KeyCode::Backspace);
    assert_eq!(app.browser.prefs().search, "1");
    // "Episode 1", "Episode 10", "Episode 11"
    assert_eq!(app.view().unwrap().total, 3);

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.focus, Focus::List);
  }

  #[test]
  fn ctrl_u_clears_search() {
    let mut app = ready_app();
    press(&mut app, KeyCode::Char('/'));
    press(&mut app, KeyCode::Char('x'));
    assert_eq!(app.view().unwrap().total, 0);
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
    assert_eq!(app.input, "");
    assert_eq!(app.view().unwrap().total, 12);
  }

  #[test]
  fn list_keys_drive_browser() {
    let mut app = ready_app();
    press(&mut app, KeyCode::Char('m'));
    assert_eq!(app.browser.page(), 2);
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.browser.prefs().sort_by, "popular");
    assert_eq!(app.browser.page(), 1);
    press(&mut app, KeyCode::Char('S'));
    assert_eq!(app.browser.prefs().sort_by, "recent");
    press(&mut app, KeyCode::Char('g'));
    assert_eq!(app.browser.prefs().selected_genre, "1");
    press(&mut app, KeyCode::Char('G'));
    assert_eq!(app.browser.prefs().selected_genre, "all");
  }

  #[test]
  fn quit_keys() {
    let mut app = ready_app();
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);

    let mut app = ready_app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[test]
  fn unbound_ctrl_chord_in_search_is_ignored() {
    let mut app = ready_app();
    press(&mut app, KeyCode::Char('/'));
    press(&mut app, KeyCode::Char('1'));
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
    assert_eq!(app.input, "1");
    assert_eq!(app.browser.store().get(KEY_SEARCH).as_deref(), Some("1"));
    assert_eq!(app.focus, Focus::Search);
  }

  #[test]
  fn q_in_search_is_text() {
    let mut app = ready_app();
    press(&mut app, KeyCode::Char('/'));
    press(&mut app, KeyCode::Char('q'));
    assert!(!app.should_quit);
    assert_eq!(app.input, "q");
  }
}
