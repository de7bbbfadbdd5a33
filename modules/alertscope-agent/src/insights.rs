/// Best-effort extraction of numbered list items from free-form model
/// output. A line counts as an item when any of its first three
/// characters is a digit. This is text post-processing, not a grammar:
/// callers must expect zero items for output that isn't a numbered list.
pub fn parse_numbered_insights(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let numbered = line.chars().take(3).any(|c| c.is_ascii_digit());
            numbered.then(|| line.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_numbered_lines_in_order() {
        let text = "Here are the findings:\n\n1. Escalate ALERT-17\n2. Review Bill Lyons's network\n10. Archive stale alerts";
        assert_eq!(
            parse_numbered_insights(text),
            vec![
                "1. Escalate ALERT-17",
                "2. Review Bill Lyons's network",
                "10. Archive stale alerts"
            ]
        );
    }

    #[test]
    fn drops_prose_and_blank_lines() {
        let text = "No numbered items here.\n\nJust prose.";
        assert!(parse_numbered_insights(text).is_empty());
    }

    #[test]
    fn empty_input_yields_no_items() {
        assert!(parse_numbered_insights("").is_empty());
    }

    #[test]
    fn digit_anywhere_in_first_three_chars_counts() {
        let text = "(1) parenthesized numbering survives";
        assert_eq!(parse_numbered_insights(text).len(), 1);
    }
}
