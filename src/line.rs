//! Line parser (spec.md §4.2): decomposes one raw source line into an
//! optional label, optional mnemonic, operand text and comment.

const MAX_LABEL_LEN: usize = 6;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedLine {
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub operand_text: String,
    pub comment: String,
}

impl ParsedLine {
    fn blank() -> Self {
        ParsedLine { label: None, mnemonic: None, operand_text: String::new(), comment: String::new() }
    }
}

/// Finds the position of `needle` in `text` that does not fall between a
/// pair of `'` characters (a character literal), or `None` if absent.
fn find_outside_quotes(text: &[char], needle: char) -> Option<usize> {
    let mut in_quote = false;
    for (i, &c) in text.iter().enumerate() {
        if c == '\'' {
            in_quote = !in_quote;
        } else if c == needle && !in_quote {
            return Some(i);
        }
    }
    None
}

pub fn parse_line(raw: &str) -> ParsedLine {
    let trimmed = raw.trim_start().trim_end_matches(|c| c == '\n' || c == '\r');
    if trimmed.is_empty() {
        return ParsedLine::blank();
    }

    let chars: Vec<char> = trimmed.chars().collect();

    // Comment: everything from the first un-quoted ';' to end of line.
    let (body_chars, comment) = match find_outside_quotes(&chars, ';') {
        Some(0) => return ParsedLine { comment: chars[1..].iter().collect(), ..ParsedLine::blank() },
        Some(pos) => (chars[..pos].to_vec(), chars[pos + 1..].iter().collect::<String>()),
        None => (chars, String::new()),
    };

    if body_chars.is_empty() {
        return ParsedLine { comment, ..ParsedLine::blank() };
    }

    // Label: everything up to the first un-quoted ':', truncated to 6 chars.
    let (label, rest_chars) = match find_outside_quotes(&body_chars, ':') {
        Some(pos) => {
            let label_len = pos.min(MAX_LABEL_LEN);
            let label: String = body_chars[..label_len].iter().collect();
            let rest: Vec<char> = body_chars[pos + 1..].to_vec();
            (Some(label), rest)
        }
        None => (None, body_chars),
    };

    let rest: String = rest_chars.into_iter().collect();
    let rest = rest.trim();
    if rest.is_empty() {
        return ParsedLine { label, comment, ..ParsedLine::blank() };
    }

    // Mnemonic/operand: split remainder on the first run of whitespace.
    let split_at = rest.find(char::is_whitespace);
    let (mnemonic_text, operand_text) = match split_at {
        Some(pos) => (&rest[..pos], rest[pos..].trim()),
        None => (rest, ""),
    };

    ParsedLine {
        label,
        mnemonic: Some(mnemonic_text.to_uppercase()),
        operand_text: operand_text.to_owned(),
        comment,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn label_mnemonic_operand_comment() {
        let parsed = parse_line("START: MVI   C,0A1H   ;load");
        assert_eq!(parsed.label.as_deref(), Some("START"));
        assert_eq!(parsed.mnemonic.as_deref(), Some("MVI"));
        assert_eq!(parsed.operand_text, "C,0A1H");
        assert_eq!(parsed.comment, "load");
    }

    #[test]
    fn comment_only_line() {
        let parsed = parse_line("   ; just a comment");
        assert_eq!(parsed.label, None);
        assert_eq!(parsed.mnemonic, None);
        assert_eq!(parsed.comment, " just a comment");
    }

    #[test]
    fn blank_line() {
        let parsed = parse_line("   \n");
        assert_eq!(parsed, ParsedLine::blank());
    }

    #[test]
    fn label_longer_than_six_chars_is_truncated() {
        let parsed = parse_line("TOOLONGLABEL: NOP");
        assert_eq!(parsed.label.as_deref(), Some("TOOLON"));
        assert_eq!(parsed.mnemonic.as_deref(), Some("NOP"));
    }

    #[test]
    fn colon_inside_char_literal_is_not_a_label_separator() {
        let parsed = parse_line("MVI A,':'");
        assert_eq!(parsed.label, None);
        assert_eq!(parsed.mnemonic.as_deref(), Some("MVI"));
        assert_eq!(parsed.operand_text, "A,':'");
    }

    #[test]
    fn semicolon_inside_char_literal_is_not_a_comment() {
        let parsed = parse_line("DB ';' ;real comment");
        assert_eq!(parsed.mnemonic.as_deref(), Some("DB"));
        assert_eq!(parsed.operand_text, "';'");
        assert_eq!(parsed.comment, "real comment");
    }

    #[test]
    fn label_only_line() {
        let parsed = parse_line("HERE:");
        assert_eq!(parsed.label.as_deref(), Some("HERE"));
        assert_eq!(parsed.mnemonic, None);
    }
}
