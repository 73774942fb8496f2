use std::fmt;

/// One lexical unit of the input stream.
///
/// End-of-line is a real token because directive bodies and macro argument
/// lists are line-delimited.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Identifier-ish run: letters, digits, `_`, `-`, `.` and any non-ASCII
    /// character. Numbers like `0x10` and `3.14` arrive as words.
    Word(String),
    /// A `"..."` or `'...'` literal; `body` excludes the quotes.
    Quoted {
        /// The delimiter character, `"` or `'`.
        quote: char,
        /// Literal content between the delimiters, escapes kept verbatim.
        body: String,
    },
    /// Any other single character.
    Punct(char),
    /// End of a physical line.
    Eol,
    /// End of the input.
    Eof,
}

impl Token {
    /// Render the token the way it should appear in the output stream.
    /// Quoted tokens get their delimiters back.
    pub fn text(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Quoted { quote, body } => format!("{quote}{body}{quote}"),
            Token::Punct(c) => c.to_string(),
            Token::Eol => "<EOL>".to_string(),
            Token::Eof => "<EOF>".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Check if a character may start a word token.
pub(crate) fn is_word_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' || (c as u32) >= 128
}

/// Check if a character may continue a word token. Same set as the start
/// set; words here cover identifiers and numeric literals alike.
pub(crate) fn is_word_continue(c: char) -> bool {
    is_word_start(c)
}

/// True if `s` is a numeric literal: hex (`0x10`, optionally suffixed with
/// one of `lLfFuU`) or anything a decimal float parse accepts.
pub fn is_number(s: &str) -> bool {
    is_hex_number(s) || s.parse::<f64>().is_ok()
}

fn is_hex_number(s: &str) -> bool {
    let rest = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(r) => r,
        None => return false,
    };
    let rest = match rest.as_bytes().last() {
        Some(b'l' | b'L' | b'f' | b'F' | b'u' | b'U') => &rest[..rest.len() - 1],
        _ => rest,
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit())
}

/// True if `s` is identifier-shaped: a letter or `_` followed by letters,
/// digits or `_`. Used to classify define values and to decide where the
/// macro expander must keep tokens apart.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert!(is_number("5"));
        assert!(is_number("3.14"));
        assert!(is_number("-1"));
        assert!(is_number("0x10"));
        assert!(is_number("0xFFu"));
        assert!(!is_number("0x"));
        assert!(!is_number("BAR"));
        assert!(!is_number("1<<3"));
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("FOO"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("5"));
        assert!(!is_identifier("0x10"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn token_text_restores_quotes() {
        let t = Token::Quoted {
            quote: '"',
            body: "x.h".to_string(),
        };
        assert_eq!(t.text(), "\"x.h\"");
        assert_eq!(Token::Punct('#').text(), "#");
    }
}
