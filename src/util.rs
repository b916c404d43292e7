/// Format a second count as zero-padded `MM:SS`.
///
/// The sign is dropped and minutes keep growing past an hour.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.unsigned_abs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Truncate `text` to at most `max_width` terminal columns, marking the cut
/// with an ellipsis.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
