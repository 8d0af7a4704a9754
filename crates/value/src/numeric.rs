//! String to number interpretation following MySQL's implicit conversion
//!
//! MySQL reads the longest numeric prefix of a string and ignores the rest:
//! `'12abc' + 1` is 13 and `'abc' + 1` is 1.

/// Parses the longest numeric prefix of `s`, skipping leading whitespace.
/// Returns `None` if no digits were found at all.
pub fn parse_numeric_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        let mut frac_digits = 0;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            frac_digits += 1;
        }
        if digits > 0 || frac_digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Returns true if the whole string (ignoring surrounding whitespace) is a number.
pub fn is_numeric_str(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.parse::<f64>().map(|f| f.is_finite()).unwrap_or(false)
        && !trimmed.eq_ignore_ascii_case("inf")
        && !trimmed.eq_ignore_ascii_case("nan")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(parse_numeric_prefix("12abc"), Some(12.0));
        assert_eq!(parse_numeric_prefix("  -3.5e2x"), Some(-350.0));
        assert_eq!(parse_numeric_prefix(".5"), Some(0.5));
        assert_eq!(parse_numeric_prefix("7e"), Some(7.0));
        assert_eq!(parse_numeric_prefix("abc"), None);
        assert_eq!(parse_numeric_prefix("-"), None);
    }

    #[test]
    fn test_is_numeric_str() {
        assert!(is_numeric_str("42"));
        assert!(is_numeric_str(" 4.25 "));
        assert!(!is_numeric_str("4x"));
        assert!(!is_numeric_str(""));
        assert!(!is_numeric_str("nan"));
    }
}
