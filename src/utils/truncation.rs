const PREVIEW_LENGTH: usize = 80;

/// Keep the head and tail of `text`, at most `max` chars in total.
pub fn truncate_middle(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max {
        return text.to_string();
    }
    if max < 5 {
        return text.chars().take(max).collect();
    }
    let keep = max - 3;
    let head = keep - keep / 2;
    let tail = keep / 2;
    let start: String = text.chars().take(head).collect();
    let end: String = text.chars().skip(len - tail).collect();
    format!("{}...{}", start, end)
}

/// Single-line preview of a response body or error message.
pub fn truncate_preview(text: &str) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_LENGTH {
        flat
    } else {
        let cut: String = flat.chars().take(PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    }
}
