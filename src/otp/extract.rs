//! Pulls a one-time code out of free-form message text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Six or more consecutive ASCII digits.
static CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]{6,}").expect("Invalid one-time code regex pattern")
});

/// Returns the first run of six or more digits in `text`, or `text` itself.
///
/// The leftmost match wins and the full run is returned, so a seven-digit
/// number is never cut down to six. Text without such a run is returned
/// unchanged, which keeps messages that carry no code readable.
///
/// # Example
///
/// ```rust
/// use otpbase::otp::extract;
///
/// assert_eq!(extract("Your code is 123456 now"), "123456");
/// assert_eq!(extract("id 12345 short"), "id 12345 short");
/// ```
pub fn extract(text: &str) -> &str {
    CODE_REGEX.find(text).map_or(text, |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_code() {
        assert_eq!(extract("Your code is 123456 now"), "123456");
    }

    #[test]
    fn test_no_digits_returns_text() {
        assert_eq!(extract("no digits here"), "no digits here");
    }

    #[test]
    fn test_short_run_returns_text() {
        assert_eq!(extract("id 12345 short"), "id 12345 short");
    }

    #[test]
    fn test_leftmost_maximal_run() {
        assert_eq!(extract("first 1234567 then 654321"), "1234567");
        assert_eq!(extract("12345 then 987654"), "987654");
    }

    #[test]
    fn test_code_at_edges() {
        assert_eq!(extract("000111"), "000111");
        assert_eq!(extract("G-482913 is your code"), "482913");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract(""), "");
    }
}
