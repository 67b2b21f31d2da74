/// Normalizes scraped article text so it embeds safely in a JSON prompt.
///
/// Control characters and backslashes become spaces, double quotes become
/// single quotes, and runs of whitespace collapse to one space.
pub fn clean_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| match c {
            '\\' => ' ',
            '"' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_controls() {
        assert_eq!(clean_text("  a\n\tb\x07  c \r\n"), "a b c");
    }

    #[test]
    fn test_replaces_quotes_and_backslashes() {
        assert_eq!(clean_text(r#"he said "no" \o/"#), "he said 'no' o/");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n "), "");
    }
}
