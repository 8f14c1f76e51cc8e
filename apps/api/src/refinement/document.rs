//! Line-level document structure helpers.
//!
//! The engine deliberately does NOT parse documents into a semantic AST.
//! It only needs to recognize three things to locate edits: heading/label
//! lines (section boundaries), bullet marker lines, and whitespace-normalized
//! equality for fuzzy matching. Everything else is opaque text.

/// Bullet marker characters recognized at the start of a line.
const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

/// Collapses every run of whitespace to a single space and trims the ends.
/// This is the equality used for fuzzy matching.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `Some((level, text))` if the line is a heading or label line.
///
/// Markdown headings map to their `#` count (1–6). A non-indented line
/// ending in `:` that is not a bullet is treated as a label heading at the
/// lowest level (6), so label-style resumes still form sections.
pub fn heading_line(line: &str) -> Option<(u8, &str)> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        let level = trimmed.chars().take_while(|&c| c == '#').count();
        if (1..=6).contains(&level) {
            let text = trimmed[level..].trim();
            return Some((level as u8, text));
        }
    }
    if !line.starts_with(char::is_whitespace)
        && !trimmed.is_empty()
        && parse_bullet(line).marker.is_none()
        && trimmed.ends_with(':')
    {
        return Some((6, trimmed.trim_end_matches(':').trim_end()));
    }
    None
}

/// A line split into indentation, optional bullet marker prefix, and content.
/// The marker slice includes its trailing whitespace so a rewrite can
/// reproduce the original prefix byte-for-byte.
#[derive(Debug, Clone, Copy)]
pub struct BulletLine<'a> {
    pub indent: &'a str,
    pub marker: Option<&'a str>,
    pub content: &'a str,
}

impl<'a> BulletLine<'a> {
    /// Rewrites this line with new content, preserving the original
    /// indentation and bullet marker. If the original line carried a marker
    /// and the replacement text lacks one, the marker is re-prepended.
    pub fn rewrite(&self, replacement: &str) -> String {
        let replacement = replacement.trim();
        match self.marker {
            Some(marker) if !starts_with_marker(replacement) => {
                format!("{}{}{}", self.indent, marker, replacement)
            }
            _ => format!("{}{}", self.indent, replacement),
        }
    }
}

/// Splits a line into `(indent, marker, content)`.
pub fn parse_bullet(line: &str) -> BulletLine<'_> {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, rest) = line.split_at(indent_len);

    let mut chars = rest.chars();
    if let Some(first) = chars.next() {
        if BULLET_MARKERS.contains(&first) {
            let after = &rest[first.len_utf8()..];
            let ws_len = after.len() - after.trim_start().len();
            // A marker must be followed by whitespace: "-item" is not a bullet.
            if ws_len > 0 {
                let marker_len = first.len_utf8() + ws_len;
                return BulletLine {
                    indent,
                    marker: Some(&rest[..marker_len]),
                    content: &rest[marker_len..],
                };
            }
        }
    }

    BulletLine {
        indent,
        marker: None,
        content: rest,
    }
}

/// Whether text already begins with a bullet marker followed by whitespace.
pub fn starts_with_marker(text: &str) -> bool {
    parse_bullet(text).marker.is_some()
}

/// Parses an Add target descriptor into `(section identifier, ordinal)`.
///
/// Accepts the shapes the planner produces: "Acme, after bullet 2",
/// "Acme after bullet 2", "Acme bullet 1". Ordinal 0 means "directly under
/// the heading". Returns None when no ordinal can be located — the caller
/// reports the operation unresolved.
pub fn parse_add_target(target: &str) -> Option<(String, usize)> {
    let lower = target.to_lowercase();
    let pos = lower.rfind("bullet")?;

    let tail = &lower[pos + "bullet".len()..];
    let digits: String = tail
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let ordinal: usize = digits.parse().ok()?;

    let mut head = target[..pos].trim_end();
    if head.to_lowercase().ends_with("after") {
        head = head[..head.len() - "after".len()].trim_end();
    }
    let section = head
        .trim_end_matches([',', ':', ';', '-'])
        .trim()
        .to_string();

    if section.is_empty() {
        return None;
    }
    Some((section, ordinal))
}

/// Reassembles lines, restoring the trailing newline if the source had one.
pub fn join_lines(lines: Vec<String>, trailing_newline: bool) -> String {
    let mut out = lines.join("\n");
    if trailing_newline {
        out.push('\n');
    }
    out
}
