/// RFC 5322 atext, plus '.' (placement is checked separately).
fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}

/// Dot-atom: atext runs separated by single dots, no leading/trailing dot.
pub(crate) fn is_dot_atom(s: &str) -> bool {
    if s.is_empty() || s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.chars().all(|c| c == '.' || is_atext(c))
}

/// Quoted-string local part: `"..."` with printable ASCII, `\` escapes allowed.
pub(crate) fn is_quoted(s: &str) -> bool {
    let Some(inner) = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return false;
    };
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            if !(c == ' ' || c.is_ascii_graphic()) {
                return false;
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' || !(c == ' ' || c.is_ascii_graphic()) {
            return false;
        }
    }
    !escaped
}

pub(crate) fn is_valid_local(s: &str) -> bool {
    is_dot_atom(s) || is_quoted(s)
}

/// A display name that can be written without quoting: atext words separated by spaces.
pub(crate) fn is_phrase(s: &str) -> bool {
    !s.is_empty()
        && s
            .split(' ')
            .all(|word| !word.is_empty() && word.chars().all(is_atext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dots() {
        assert!(!is_dot_atom(".abc"));
        assert!(!is_dot_atom("abc."));
        assert!(!is_dot_atom("a..b"));
        assert!(is_dot_atom("a.b"));
        assert!(is_dot_atom("first+tag"));
    }

    #[test]
    fn quoted() {
        assert!(is_valid_local("\"a b\""));
        assert!(is_valid_local("\"a\\\"b\""));
        assert!(!is_valid_local("\"a\"b\""));
        assert!(!is_valid_local("\"dangling\\\""));
    }

    #[test]
    fn phrases() {
        assert!(is_phrase("John Doe"));
        assert!(!is_phrase("Doe, John"));
        assert!(!is_phrase("John  Doe"));
        assert!(!is_phrase(""));
    }
}
