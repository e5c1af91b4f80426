//! Display decoration helpers shared by the listing engine and the recency
//! feed: name truncation, IP masking, thumbnail extraction, short datetime.

use chrono::{DateTime, Datelike, Utc};

/// Fixed placeholder shown in place of a secret comment's content.
pub const SECRET_PLACEHOLDER: &str = "This is a secret comment.";

/// Truncate a display name to `cut` characters (0 = no truncation).
/// Char-based, never splits a multibyte name.
pub fn cut_name(name: &str, cut: usize) -> String {
    if cut == 0 || name.chars().count() <= cut {
        return name.to_string();
    }
    name.chars().take(cut).collect()
}

/// Privacy-masked IP for non-admin viewers: the two middle IPv4 octets are
/// replaced with `*`. Anything that is not dotted-quad is fully masked.
pub fn mask_ip(ip: &str, show_full: bool) -> String {
    if show_full {
        return ip.to_string();
    }
    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() == 4 {
        format!("{}.*.*.{}", parts[0], parts[3])
    } else {
        "*".to_string()
    }
}

/// First `<img src="...">` value in an HTML fragment, for thumbnail
/// derivation when a post carries no attached image.
pub fn first_img_src(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let tag_at = lower.find("<img")?;
    let src_at = lower[tag_at..].find("src=")? + tag_at + 4;
    let rest = &html[src_at..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        // unquoted src: take up to whitespace or '>'
        let end = rest.find(|c: char| c.is_whitespace() || c == '>')?;
        return Some(rest[..end].to_string());
    }
    let body = &rest[1..];
    let end = body.find(quote)?;
    Some(body[..end].to_string())
}

/// Today's rows show the time, older rows the date.
pub fn short_datetime(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if at.date_naive() == now.date_naive() {
        at.format("%H:%M").to_string()
    } else {
        // two-digit year keeps list columns narrow
        format!(
            "{:02}-{:02}-{:02}",
            at.year() % 100,
            at.month(),
            at.day()
        )
    }
}

/// Char-safe content prefix used for comment entries in the recency feed.
pub fn content_preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    content.chars().take(max_chars).collect()
}
