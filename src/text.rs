//! Text helpers for comment ingestion and report formatting.

/// Strip characters from a free-text comment that would break a flat-file
/// (CSV) export. Commas and line breaks are replaced with `"; "`.
pub fn sanitize_comment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == ',' || c == '\n' {
            out.push_str("; ");
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a lower camelCase metric name to sentence case for display,
/// e.g. `"cargoShipHatches"` becomes `"Cargo ship hatches"`.
pub fn camel_to_sentence_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for (i, c) in camel.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_comment() {
        assert_eq!(sanitize_comment("fast, reliable"), "fast;  reliable");
        assert_eq!(sanitize_comment("line one\nline two"), "line one; line two");
        assert_eq!(sanitize_comment("clean"), "clean");
        assert_eq!(sanitize_comment(""), "");
    }

    #[test]
    fn test_camel_to_sentence_case() {
        assert_eq!(camel_to_sentence_case("cargoShipHatches"), "Cargo ship hatches");
        assert_eq!(camel_to_sentence_case("rocketLevelOneCargo"), "Rocket level one cargo");
        assert_eq!(camel_to_sentence_case("total"), "Total");
        assert_eq!(camel_to_sentence_case(""), "");
    }
}
