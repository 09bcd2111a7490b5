/// Default maximum excerpt length, in characters.
pub const EXCERPT_LENGTH: usize = 140;

pub const ELLIPSIS: char = '…';

/// Plain-text summary of a raw Markdown body.
///
/// Whitespace runs (newlines included) collapse to a single space. Text longer
/// than `length` characters is cut to `length - 1` characters, right-trimmed,
/// and ends with [`ELLIPSIS`].
pub fn build_excerpt(text: &str, length: usize) -> String {
    let plain = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if plain.chars().count() <= length {
        return plain;
    }

    let mut excerpt: String = plain.chars().take(length.saturating_sub(1)).collect();
    excerpt.truncate(excerpt.trim_end().len());
    excerpt.push(ELLIPSIS);
    excerpt
}
