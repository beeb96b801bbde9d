/*!
format.rs

Human-readable output helpers for the `tools` and `call` commands.

  - StyleOptions::detect() honours NO_COLOR / NO_EMOJI / COLUMNS
  - color(role, text, &style), emoji(tag, &style)
  - banner(title, subtitle, &style): one-line boxed heading
  - table(headers, rows, &style): aligned columns, widest column shrunk first

JSON output paths must not use these helpers.
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
        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        Self {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width,
        }
    }

    #[cfg(test)]
    pub fn plain(term_width: usize) -> Self {
        Self {
            use_color: false,
            use_emoji: false,
            term_width,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "error" => "✖",
        "tool" => "🛠",
        "list" => "📜",
        _ => "",
    }
}

/// Single-line heading framed by a light box.
pub fn banner(title: &str, subtitle: Option<&str>, style: &StyleOptions) -> String {
    let plain = match subtitle {
        Some(sub) => format!("{title}  {sub}"),
        None => title.to_string(),
    };
    let max_inner = style.term_width.saturating_sub(4).max(8);
    let plain = truncate_ellipsis(&plain, max_inner);
    let inner = plain.chars().count();

    // Color is applied after measuring so escapes never affect width.
    let styled = match plain.strip_prefix(title) {
        Some(rest) if subtitle.is_some() && !rest.is_empty() => format!(
            "{}{}",
            color(Role::Primary, title, style),
            color(Role::Secondary, rest, style)
        ),
        _ => color(Role::Primary, &plain, style),
    };

    let rule = "─".repeat(inner + 2);
    format!("┌{rule}┐\n│ {styled} │\n└{rule}┘")
}

/// Render rows under headers; cells longer than their column end in `…`.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(display_width(cell));
        }
    }

    let gaps = (cols - 1) * 2;
    let mut total: usize = widths.iter().sum::<usize>() + gaps;
    while total > style.term_width {
        let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if widest <= 4 {
            break;
        }
        widths[idx] = widest - 1;
        total -= 1;
    }

    let render = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| fit(c, *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![color(
        Role::Accent,
        render(headers.iter().map(|h| h.to_string()).collect()),
        style,
    )];
    lines.push(color(
        Role::Dim,
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "),
        style,
    ));
    for row in rows {
        let mut cells = row.clone();
        cells.resize(cols, String::new());
        lines.push(render(cells));
    }
    lines.join("\n")
}

fn fit(cell: &str, width: usize) -> String {
    let cut = truncate_ellipsis(&strip_ansi(cell), width);
    let pad = width.saturating_sub(cut.chars().count());
    format!("{cut}{}", " ".repeat(pad))
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Remove CSI escape sequences (`ESC [ ... letter`).
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
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
        out.push(c);
    }
    Cow::Owned(out)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}
