//! Reply text for the reaction commands.

/// Discord's per-message content limit.
pub const MESSAGE_LIMIT: usize = 2000;

pub const WARNING_PREFIX: &str = "⚠️ ";

/// Render the trigger list for a guild.
///
/// Returns `None` when there is nothing to list.
pub fn format_trigger_list(guild_name: &str, pairs: &[(String, String)]) -> Option<String> {
    if pairs.is_empty() {
        return None;
    }

    let mut text = format!("# Reactions for {}:\n", guild_name);
    for (emoji, word) in pairs {
        text.push_str(&format!("- {}: {}\n", emoji, word));
    }
    Some(text)
}

/// Find the last UTF-8 char boundary at or before `byte_index` in `s`.
fn floor_char_boundary(s: &str, byte_index: usize) -> usize {
    if byte_index >= s.len() {
        return s.len();
    }
    let mut i = byte_index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Split text into pages of at most `max_len` bytes.
///
/// Pages break after a newline whenever possible. A single line longer than
/// a page is hard-split on a char boundary.
pub fn paginate(text: &str, max_len: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            pages.push(remaining.to_string());
            break;
        }

        let limit = floor_char_boundary(remaining, max_len);
        let split_at = match remaining[..limit].rfind('\n') {
            Some(newline) => newline + 1,
            None if limit > 0 => limit,
            // max_len is smaller than the first character: take it anyway.
            None => remaining
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(remaining.len()),
        };

        pages.push(remaining[..split_at].to_string());
        remaining = &remaining[split_at..];
    }

    pages.retain(|page| !page.trim().is_empty());
    pages
}
