//! Title wrapping for diagram labels.

/// Characters per line in node labels.
pub const TITLE_WIDTH: usize = 30;

/// Re-flow `text` into lines of at most `width` characters.
///
/// Breaks happen at whitespace; runs of whitespace collapse to a single space
/// and leading/trailing whitespace is dropped. A word longer than `width` is
/// split into `width`-sized chunks.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        // Fill the rest of the line with the head of an overlong word.
        while chars.len() > width {
            let room = if current_len == 0 {
                width
            } else {
                width.saturating_sub(current_len + 1)
            };
            if room == 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            if current_len > 0 {
                current.push(' ');
            }
            current.extend(chars.drain(..room));
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let len = chars.len();
        if current_len > 0 && current_len + 1 + len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += len;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap `text` and join the lines with `line_break`.
pub fn wrap_title(text: &str, width: usize, line_break: &str) -> String {
    wrap_lines(text, width).join(line_break)
}
