/// Greedy word wrap.
///
/// Words are separated by single spaces. A line is broken before a word when
/// the line with that word and a trailing space measures wider than
/// `max_width`; the first word always stays on the first line, so a single
/// over-long word is never split.
pub fn wrap_words<F>(text: &str, max_width: f64, mut measure: F) -> Vec<String>
where
    F: FnMut(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for (n, word) in text.split(' ').enumerate() {
        let candidate = format!("{line}{word} ");
        if n > 0 && measure(&candidate) > max_width {
            lines.push(line.trim().to_string());
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    lines.push(line.trim().to_string());
    lines
}
