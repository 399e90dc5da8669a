use ratatui::style::Color;

/// A colour palette for the whole UI.
#[derive(Debug)]
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub muted: Color,
  pub accent: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: &[Theme] = &[
  Theme {
    name: "Mocha",
    bg: Color::Rgb(30, 30, 46),
    fg: Color::Rgb(205, 214, 244),
    muted: Color::Rgb(127, 132, 156),
    accent: Color::Rgb(203, 166, 247),
    border: Color::Rgb(69, 71, 90),
    highlight_fg: Color::Rgb(30, 30, 46),
    highlight_bg: Color::Rgb(203, 166, 247),
    stripe_bg: Color::Rgb(36, 36, 54),
    status: Color::Rgb(249, 226, 175),
    error: Color::Rgb(243, 139, 168),
    key_fg: Color::Rgb(30, 30, 46),
    key_bg: Color::Rgb(137, 180, 250),
  },
  Theme {
    name: "Latte",
    bg: Color::Rgb(239, 241, 245),
    fg: Color::Rgb(76, 79, 105),
    muted: Color::Rgb(140, 143, 161),
    accent: Color::Rgb(136, 57, 239),
    border: Color::Rgb(188, 192, 204),
    highlight_fg: Color::Rgb(239, 241, 245),
    highlight_bg: Color::Rgb(136, 57, 239),
    stripe_bg: Color::Rgb(230, 233, 239),
    status: Color::Rgb(223, 142, 29),
    error: Color::Rgb(210, 15, 57),
    key_fg: Color::Rgb(239, 241, 245),
    key_bg: Color::Rgb(30, 102, 245),
  },
  Theme {
    name: "Gruvbox",
    bg: Color::Rgb(40, 40, 40),
    fg: Color::Rgb(235, 219, 178),
    muted: Color::Rgb(146, 131, 116),
    accent: Color::Rgb(254, 128, 25),
    border: Color::Rgb(80, 73, 69),
    highlight_fg: Color::Rgb(40, 40, 40),
    highlight_bg: Color::Rgb(250, 189, 47),
    stripe_bg: Color::Rgb(50, 48, 47),
    status: Color::Rgb(184, 187, 38),
    error: Color::Rgb(251, 73, 52),
    key_fg: Color::Rgb(40, 40, 40),
    key_bg: Color::Rgb(131, 165, 152),
  },
  Theme {
    name: "Mono",
    bg: Color::Reset,
    fg: Color::White,
    muted: Color::DarkGray,
    accent: Color::Cyan,
    border: Color::Gray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Cyan,
    stripe_bg: Color::Reset,
    status: Color::Yellow,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

/// Index of the theme called `name`, or the first theme.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}
