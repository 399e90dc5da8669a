use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, Focus, LoadState, Row};
use crate::catalog::{Podcast, genre_title};
use crate::theme::Theme;
use crate::view::{GenreFilter, SortKey};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

pub fn seasons_label(podcast: &Podcast) -> String {
  match podcast.season_count() {
    1 => "1 season".to_string(),
    n => format!("{} seasons", n),
  }
}

pub fn updated_label(podcast: &Podcast) -> String {
  match podcast.updated_at() {
    Some(dt) => format!("Updated {}", dt.format("%-d %b %Y")),
    None => "Updated —".to_string(),
  }
}

pub fn genres_label(podcast: &Podcast) -> String {
  podcast.genres.iter().map(|&id| genre_title(id)).collect::<Vec<_>>().join(", ")
}

/// Selector text for the filter bar.
pub fn genre_selector_label(selector: &str) -> String {
  match GenreFilter::parse(selector) {
    GenreFilter::All => "All Genres".to_string(),
    GenreFilter::Genre(id) => genre_title(id),
  }
}

pub fn sort_selector_label(sort_by: &str) -> String {
  SortKey::from_key(sort_by).map_or_else(|| format!("{} (unsorted)", sort_by), |k| k.label().to_string())
}

fn rounded_block<'a>(title: impl Into<Line<'a>>, theme: &Theme, focused: bool) -> Block<'a> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, search_area, filter_area, main_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, header_area);
  render_search(frame, app, search_area);
  render_filter_bar(frame, app, filter_area);
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let left =
    Line::from(Span::styled(" 🎙 Podcast Explorer ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_search(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Search;
  let block = rounded_block(" Search podcasts ", theme, focused).padding(Padding::horizontal(1));

  if app.input.is_empty() && !focused {
    let hint =
      Paragraph::new(Span::styled("Press / to search by title…", Style::default().fg(theme.muted))).block(block);
    frame.render_widget(hint, area);
    return;
  }

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  frame.render_widget(Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(block), area);

  if focused {
    let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let prefs = app.browser.prefs();
  let mut spans = vec![
    Span::styled(" Genre ", Style::default().fg(theme.muted)),
    Span::styled(
      genre_selector_label(&prefs.selected_genre),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    ),
    Span::styled("   Sort ", Style::default().fg(theme.muted)),
    Span::styled(sort_selector_label(&prefs.sort_by), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
  ];
  if let Some(view) = app.view() {
    spans.push(Span::styled(
      format!("   Showing {} of {}", view.visible.len(), view.total),
      Style::default().fg(theme.muted),
    ));
  }
  frame.render_widget(Line::from(spans), area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  match app.load_state {
    LoadState::Loading => render_loading(frame, app, area),
    LoadState::Error(ref message) => render_error(frame, app.theme(), message, area),
    LoadState::Ready(_) => render_catalog(frame, app, area),
  }
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let spinner = SPINNER[app.spinner_frame() % SPINNER.len()];
  let text = vec![
    Line::from(""),
    Line::from(Span::styled(spinner, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Loading podcasts...", Style::default().fg(theme.fg))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(rounded_block("", theme, false));
  frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, theme: &Theme, message: &str, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled(
      format!("Error occurred while trying to fetch podcasts: {}", message),
      Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(Span::styled("Press q to quit.", Style::default().fg(theme.muted))),
  ];
  let paragraph =
    Paragraph::new(text).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(rounded_block("", theme, false));
  frame.render_widget(paragraph, area);
}

fn render_catalog(frame: &mut Frame, app: &mut App, area: Rect) {
  let [list_area, detail_area] =
    Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);
  render_list(frame, app, list_area);
  render_detail(frame, app, detail_area);
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let rows = app.rows();
  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let selected = app.list_state.selected();

  let items: Vec<ListItem> = {
    let Some(view) = app.view() else { return };
    rows
      .iter()
      .enumerate()
      .map(|(i, row)| {
        let is_selected = Some(i) == selected;
        let fg = if is_selected { theme.highlight_fg } else { theme.fg };
        let bg = if is_selected {
          theme.highlight_bg
        } else if i % 2 == 1 {
          theme.stripe_bg
        } else {
          theme.bg
        };

        let line = match row {
          Row::Podcast(idx) => {
            let podcast = view.visible[*idx];
            let right = seasons_label(podcast);
            let right_w = right.chars().count();
            let title = truncate_str(&podcast.title, inner_w.saturating_sub(right_w + 2));
            let gap = inner_w.saturating_sub(title.chars().count() + right_w);
            Line::from(vec![
              Span::styled(title, Style::default().fg(fg)),
              Span::raw(" ".repeat(gap)),
              Span::styled(right, Style::default().fg(if is_selected { fg } else { theme.muted })),
            ])
          }
          Row::LoadMore => Line::from(Span::styled(
            format!("↓ Load more ({} remaining)", view.total - view.visible.len()),
            Style::default().fg(if is_selected { fg } else { theme.accent }).add_modifier(Modifier::ITALIC),
          )),
        };

        ListItem::new(line).bg(bg)
      })
      .collect()
  };

  let empty = items.is_empty();
  let list = List::new(items)
    .block(rounded_block(" Podcasts ", theme, app.focus == Focus::List))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  if empty {
    let paragraph = Paragraph::new(Span::styled("No podcasts match your filters.", Style::default().fg(theme.muted)))
      .alignment(Alignment::Center)
      .block(rounded_block(" Podcasts ", theme, app.focus == Focus::List));
    frame.render_widget(paragraph, area);
  } else {
    frame.render_stateful_widget(list, area, &mut app.list_state);
  }
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let block = rounded_block(" Details ", theme, false).padding(Padding::horizontal(1));
  let Some(podcast) = app.selected_podcast() else {
    frame.render_widget(block, area);
    return;
  };

  let label = |s: &'static str| Span::styled(s, Style::default().fg(theme.muted));
  let mut lines = vec![
    Line::from(Span::styled(podcast.title.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(vec![label("Genres   "), Span::styled(genres_label(podcast), Style::default().fg(theme.accent))]),
    Line::from(vec![label("Seasons  "), Span::styled(seasons_label(podcast), Style::default().fg(theme.fg))]),
    Line::from(Span::styled(updated_label(podcast), Style::default().fg(theme.muted))),
  ];
  if let Some(image) = podcast.image.as_deref().filter(|i| !i.trim().is_empty()) {
    lines.push(Line::from(vec![
      label("Artwork  "),
      Span::styled(image.trim().to_string(), Style::default().fg(theme.muted).add_modifier(Modifier::UNDERLINED)),
    ]));
  }
  if let Some(description) = podcast.description.as_deref().filter(|d| !d.trim().is_empty()) {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(description.trim().to_string(), Style::default().fg(theme.fg))));
  }

  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.notice {
    (format!(" {}", msg), Style::default().fg(theme.status))
  } else {
    match &app.load_state {
      LoadState::Loading => (" Fetching catalog…".to_string(), Style::default().fg(theme.status)),
      LoadState::Error(_) => (" ⚠  Catalog unavailable".to_string(), Style::default().fg(theme.error)),
      LoadState::Ready(podcasts) => (
        format!(" {} podcasts in catalog · page {}", podcasts.len(), app.browser.page()),
        Style::default().fg(theme.muted),
      ),
    }
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = match app.focus {
    Focus::Search => vec![("Enter", "Done"), ("^u", "Clear"), ("^t", "Theme")],
    Focus::List => {
      let mut k = vec![("/", "Search"), ("g", "Genre"), ("s", "Sort"), ("j/k", "Navigate")];
      if app.view().is_some_and(|v| v.has_more) {
        k.push(("m", "More"));
      }
      k.push(("^t", "Theme"));
      k.push(("q", "Quit"));
      k
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
