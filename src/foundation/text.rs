/// Upper bound, in characters, for any message shown to a user or a generator.
pub const MAX_MESSAGE_CHARS: usize = 400;

const ELLIPSIS: &str = "...";

/// Truncate `msg` to at most `max_chars` characters, appending an ellipsis when cut.
///
/// Control characters other than newline and tab are replaced so the excerpt is safe to embed in
/// a visual tree or a terminal.
pub fn bounded_excerpt(msg: &str, max_chars: usize) -> String {
    let clean = |c: char| {
        if c.is_control() && c != '\n' && c != '\t' {
            ' '
        } else {
            c
        }
    };

    if msg.chars().count() <= max_chars {
        return msg.chars().map(clean).collect();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = msg.chars().take(keep).map(clean).collect();
    out.push_str(ELLIPSIS);
    out
}

/// [`bounded_excerpt`] with the default [`MAX_MESSAGE_CHARS`] bound.
pub fn bounded_message(msg: &str) -> String {
    bounded_excerpt(msg, MAX_MESSAGE_CHARS)
}
