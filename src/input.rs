//! Submission gate

/// Submission is allowed iff the trimmed text is non-empty and nothing is in flight.
pub fn can_submit(text: &str, busy: bool) -> bool {
    !busy && !text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_idle_is_allowed() {
        assert!(can_submit("hola", false));
        assert!(can_submit("  ¿Qué hora es?  ", false));
    }

    #[test]
    fn test_whitespace_is_rejected() {
        for text in ["", " ", "\t\n", "   \r\n  "] {
            assert!(!can_submit(text, false), "{:?} should be rejected", text);
        }
    }

    #[test]
    fn test_busy_blocks_everything() {
        assert!(!can_submit("hola", true));
        assert!(!can_submit("", true));
    }
}
