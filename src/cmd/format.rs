/*!
format.rs

Console styling for human output: colour roles, emoji tags, a boxed banner
and a two-column table for the tool catalog.

Style detection:
  NO_COLOR  -> plain text
  NO_EMOJI  -> no emoji
  COLUMNS   -> width (clamped 40..=220, default 100)

Helpers return strings; callers decide where to write them. JSON output
paths never go through this module.
*/

use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: width,
        }
    }

    /// Terminal-aware styling for stdout; redirected output gets `plain()`.
    pub fn for_stdout(is_terminal: bool) -> Self {
        if is_terminal {
            Self::detect()
        } else {
            Self::plain()
        }
    }

    /// No colour, no emoji, fixed width.
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width: 100,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Warning,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",    // cyan-ish
        Role::Secondary => "38;5;250", // gray
        Role::Accent => "38;5;213",    // magenta/pink
        Role::Success => "38;5;82",    // green
        Role::Warning => "38;5;214",   // orange
        Role::Error => "38;5;196",     // red
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/// Emoji for a tag, followed by a space so callers can prefix blindly.
pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔ ",
        "error" => "✖ ",
        "warn" => "⚠ ",
        "info" => "ℹ ",
        "plug" => "🔌 ",
        "tool" => "🛠 ",
        "design" => "🎨 ",
        _ => "",
    }
}

/// Single-line boxed banner: title plus optional dimmed subtitle.
pub fn box_header(title: &str, subtitle: Option<&str>, style: &StyleOptions) -> String {
    let inner = match subtitle {
        Some(s) => format!(
            "{}  {}",
            color(Role::Primary, title, style),
            color(Role::Secondary, s, style)
        ),
        None => color(Role::Primary, title, style),
    };
    let max_inner = style.term_width.saturating_sub(4).max(16);
    let inner = if display_width(&inner) > max_inner {
        truncate_ellipsis(&strip_ansi(&inner), max_inner)
    } else {
        inner
    };
    let width = display_width(&inner) + 2;
    let bar = "─".repeat(width);
    format!(
        "┌{bar}┐\n│ {inner}{pad} │\n└{bar}┘",
        pad = " ".repeat(width - 2 - display_width(&inner))
    )
}

/// Left-aligned table with a dashed separator under the header row.
/// The last column absorbs truncation when the total exceeds the terminal width.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }
    let total: usize = widths.iter().sum::<usize>() + (cols - 1) * 2;
    if total > style.term_width {
        let last = cols - 1;
        let overflow = total - style.term_width;
        widths[last] = widths[last].saturating_sub(overflow).max(4);
    }

    let render_row = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| pad_or_truncate(c, widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(color(
        Role::Accent,
        render_row(headers.iter().map(|h| h.to_string()).collect()),
        style,
    ));
    out.push(color(
        Role::Dim,
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
        style,
    ));
    for row in rows {
        let cells = (0..cols)
            .map(|c| row.get(c).cloned().unwrap_or_default())
            .collect();
        out.push(render_row(cells));
    }
    out.join("\n")
}

fn pad_or_truncate(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    truncate_ellipsis(&strip_ansi(s), width)
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    // ESC '[' ... letter
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}
