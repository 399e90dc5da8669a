//! Catalog view derivation.
//!
//! Turns the raw catalog plus the user's search text, genre selector, sort key
//! and page count into the slice of podcasts that is actually shown:
//!
//! raw → search filter → genre filter → sort → page slice
//!
//! Everything here is pure and recomputed from scratch on every draw.

use std::cmp::Ordering;

use tracing::debug;

use crate::catalog::Podcast;

/// Podcasts revealed per "load more" step.
pub const PAGE_SIZE: usize = 8;

/// Selector value meaning "no genre filter".
pub const ALL_GENRES: &str = "all";

/// The five supported orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
  /// Most recently updated first.
  Recent,
  /// Most seasons first.
  Popular,
  /// Descending id.
  Newest,
  TitleAsc,
  TitleDesc,
}

impl SortKey {
  pub const ALL: [SortKey; 5] =
    [SortKey::Recent, SortKey::Popular, SortKey::Newest, SortKey::TitleAsc, SortKey::TitleDesc];

  /// The persisted string form.
  pub fn key(self) -> &'static str {
    match self {
      SortKey::Recent => "recent",
      SortKey::Popular => "popular",
      SortKey::Newest => "newest",
      SortKey::TitleAsc => "title-asc",
      SortKey::TitleDesc => "title-desc",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      SortKey::Recent => "Recently Updated",
      SortKey::Popular => "Most Popular",
      SortKey::Newest => "Newest",
      SortKey::TitleAsc => "Title (A-Z)",
      SortKey::TitleDesc => "Title (Z-A)",
    }
  }

  /// Returns `None` for unrecognised keys; callers then leave the order untouched.
  pub fn from_key(s: &str) -> Option<Self> {
    SortKey::ALL.into_iter().find(|k| k.key() == s)
  }

  fn compare(self, a: &Podcast, b: &Podcast) -> Ordering {
    match self {
      // Unparseable timestamps compare as `None`, i.e. older than any real date.
      SortKey::Recent => b.updated_at().cmp(&a.updated_at()),
      SortKey::Popular => b.season_count().cmp(&a.season_count()),
      SortKey::Newest => locale_cmp(&b.id, &a.id),
      SortKey::TitleAsc => locale_cmp(&a.title, &b.title),
      SortKey::TitleDesc => locale_cmp(&b.title, &a.title),
    }
  }
}

/// Parsed genre selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreFilter {
  All,
  Genre(i64),
}

impl GenreFilter {
  /// `"all"` and anything that isn't an integer both mean no filtering.
  pub fn parse(selector: &str) -> Self {
    let selector = selector.trim();
    if selector == ALL_GENRES {
      return GenreFilter::All;
    }
    match selector.parse::<i64>() {
      Ok(id) => GenreFilter::Genre(id),
      Err(_) => {
        debug!(selector, "view: unparseable genre selector, showing all genres");
        GenreFilter::All
      }
    }
  }
}

/// Case-folded comparison with a raw tiebreak so the order stays total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
  a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

pub fn filter_by_search<'a>(podcasts: &'a [Podcast], search: &str) -> Vec<&'a Podcast> {
  let needle = search.to_lowercase();
  podcasts.iter().filter(|p| p.title.to_lowercase().contains(&needle)).collect()
}

pub fn filter_by_genre<'a>(podcasts: Vec<&'a Podcast>, selector: &str) -> Vec<&'a Podcast> {
  match GenreFilter::parse(selector) {
    GenreFilter::All => podcasts,
    GenreFilter::Genre(id) => podcasts.into_iter().filter(|p| p.has_genre(id)).collect(),
  }
}

/// Returns a sorted copy. Unknown keys keep the incoming order.
pub fn sort_podcasts<'a>(podcasts: &[&'a Podcast], sort_by: &str) -> Vec<&'a Podcast> {
  let mut sorted = podcasts.to_vec();
  match SortKey::from_key(sort_by) {
    // `slice::sort_by` is stable: equal keys keep their filtered order.
    Some(key) => sorted.sort_by(|a, b| key.compare(a, b)),
    None => debug!(sort_by, "view: unknown sort key, keeping filtered order"),
  }
  sorted
}

/// Number of items visible on `page` (1-based; 0 is treated as 1).
pub fn visible_len(total: usize, page: usize) -> usize {
  page.max(1).saturating_mul(PAGE_SIZE).min(total)
}

/// The slice of the catalog the user currently sees.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogView<'a> {
  pub visible: Vec<&'a Podcast>,
  /// Filtered and sorted count, before paging.
  pub total: usize,
  pub has_more: bool,
}

/// Run the whole pipeline.
pub fn derive_view<'a>(
  podcasts: &'a [Podcast],
  search: &str,
  selected_genre: &str,
  sort_by: &str,
  page: usize,
) -> CatalogView<'a> {
  let searched = filter_by_search(podcasts, search);
  let filtered = filter_by_genre(searched, selected_genre);
  let mut sorted = sort_podcasts(&filtered, sort_by);
  let total = sorted.len();
  sorted.truncate(visible_len(total, page));
  let has_more = total > sorted.len();
  CatalogView { visible: sorted, total, has_more }
}
