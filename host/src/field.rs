/// `-` is how host listings print an empty cell.
pub fn optional_field(field: &str) -> Option<&str> {
    match field.trim() {
        "" | "-" => None,
        value => Some(value),
    }
}

pub fn is_truthy(field: &str) -> bool {
    let field = field.trim();
    field.eq_ignore_ascii_case("true") || field.eq_ignore_ascii_case("yes") || field == "1"
}

/// Value of a `Key:   value` line, if `line` starts with `label`.
pub fn labeled_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.trim().strip_prefix(label).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_is_absent() {
        assert_eq!(optional_field("-"), None);
        assert_eq!(optional_field(" 10.0.3.5 "), Some("10.0.3.5"));
    }

    #[test]
    fn truthy_words() {
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("Yes"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("-"));
    }

    #[test]
    fn labeled_values() {
        assert_eq!(labeled_value("  State:          RUNNING", "State:"), Some("RUNNING"));
        assert_eq!(labeled_value("PID: 12", "State:"), None);
    }
}
