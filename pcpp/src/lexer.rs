use crate::error::PreprocessError;
use crate::token::{Token, is_word_continue, is_word_start};

/// Word/quote/comment-aware tokenizer over one input file.
///
/// `//` and `/* */` comments are consumed as whitespace, block comments
/// keeping the line counter honest so the output writer can re-sync.
/// Backslash-newline continuations are spliced away up front. One token of
/// pushback is supported; pushing back re-delivers the last token unchanged.
pub(crate) struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    filename: String,
    pushed: bool,
    cur: Token,
}

impl Lexer {
    pub fn new(input: &str, filename: &str) -> Self {
        Lexer {
            chars: splice_continuations(input),
            pos: 0,
            line: 1,
            filename: filename.to_string(),
            pushed: false,
            cur: Token::Eof,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Re-deliver the current token on the next `next_token` call.
    pub fn push_back(&mut self) {
        self.pushed = true;
    }

    /// True when a `(` sits directly after the token just scanned, with no
    /// intervening whitespace. This is how `#define NAME(` is told apart
    /// from `#define NAME (value)` without mutating tokenizer rules.
    pub fn glued_lparen(&self) -> bool {
        self.peek() == Some('(')
    }

    pub fn next_token(&mut self) -> Result<Token, PreprocessError> {
        if self.pushed {
            self.pushed = false;
            return Ok(self.cur.clone());
        }
        self.skip_blanks_and_comments();

        let tok = match self.peek() {
            None => Token::Eof,
            Some('\n') => {
                self.pos += 1;
                self.line += 1;
                Token::Eol
            }
            Some('\r') => {
                self.pos += 1;
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
                self.line += 1;
                Token::Eol
            }
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                self.scan_quoted(q)?
            }
            Some(c) if is_word_start(c) => self.scan_word(),
            Some(c) => {
                self.pos += 1;
                Token::Punct(c)
            }
        };
        self.cur = tok.clone();
        Ok(tok)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c != '\n' && c != '\r' && (c as u32) <= 32 => {
                    self.pos += 1;
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    // Line comment: stop before the newline so EOL is still
                    // delivered as a token.
                    self.pos += 2;
                    while let Some(c) = self.peek() {
                        if c == '\n' || c == '\r' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    let mut prev = '\0';
                    while let Some(c) = self.peek() {
                        self.pos += 1;
                        if c == '\n' {
                            self.line += 1;
                        }
                        if prev == '*' && c == '/' {
                            break;
                        }
                        prev = c;
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_word(&mut self) -> Token {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if !is_word_continue(c) {
                break;
            }
            word.push(c);
            self.pos += 1;
        }
        Token::Word(word)
    }

    fn scan_quoted(&mut self, quote: char) -> Result<Token, PreprocessError> {
        let mut body = String::new();
        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(PreprocessError::UnterminatedLiteral {
                        file: self.filename.clone(),
                        line: self.line,
                    });
                }
                Some('\\') => {
                    body.push('\\');
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        body.push(escaped);
                        self.pos += 1;
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(Token::Quoted { quote, body });
                }
                Some(c) => {
                    body.push(c);
                    self.pos += 1;
                }
            }
        }
    }
}

/// Remove backslash-newline sequences so a continued line tokenizes as one
/// logical line.
fn splice_continuations(input: &str) -> Vec<char> {
    if !input.contains('\\') {
        return input.chars().collect();
    }
    let mut out = Vec::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek() {
                Some('\n') => {
                    chars.next();
                }
                Some('\r') => {
                    chars.next();
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                }
                _ => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str) -> Vec<Token> {
        let mut lx = Lexer::new(input, "test.h");
        let mut toks = Vec::new();
        loop {
            let t = lx.next_token().unwrap();
            let done = t == Token::Eof;
            toks.push(t);
            if done {
                break;
            }
        }
        toks
    }

    #[test]
    fn words_admit_dash_and_dot() {
        let toks = collect("GL_VERSION_1.2 -5 0x10");
        assert_eq!(
            toks,
            vec![
                Token::Word("GL_VERSION_1.2".to_string()),
                Token::Word("-5".to_string()),
                Token::Word("0x10".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn eol_is_a_token() {
        let toks = collect("a\nb");
        assert_eq!(
            toks,
            vec![
                Token::Word("a".to_string()),
                Token::Eol,
                Token::Word("b".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_stripped() {
        let toks = collect("a // trailing\nb /* inline */ c");
        assert_eq!(
            toks,
            vec![
                Token::Word("a".to_string()),
                Token::Eol,
                Token::Word("b".to_string()),
                Token::Word("c".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn block_comment_counts_lines() {
        let mut lx = Lexer::new("a /* one\ntwo\nthree */ b", "test.h");
        assert_eq!(lx.next_token().unwrap(), Token::Word("a".to_string()));
        assert_eq!(lx.next_token().unwrap(), Token::Word("b".to_string()));
        assert_eq!(lx.line(), 3);
    }

    #[test]
    fn quoted_literals_keep_escapes() {
        let toks = collect(r#""a\"b" 'c'"#);
        assert_eq!(
            toks,
            vec![
                Token::Quoted {
                    quote: '"',
                    body: "a\\\"b".to_string()
                },
                Token::Quoted {
                    quote: '\'',
                    body: "c".to_string()
                },
                Token::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_quote_is_fatal() {
        let mut lx = Lexer::new("\"oops\nmore", "test.h");
        assert!(matches!(
            lx.next_token(),
            Err(PreprocessError::UnterminatedLiteral { .. })
        ));
    }

    #[test]
    fn continuation_splices_lines() {
        let toks = collect("AB\\\nCD");
        assert_eq!(toks, vec![Token::Word("ABCD".to_string()), Token::Eof]);
    }

    #[test]
    fn glued_lparen_detection() {
        let mut lx = Lexer::new("ADD(a) FOO (x)", "test.h");
        assert_eq!(lx.next_token().unwrap(), Token::Word("ADD".to_string()));
        assert!(lx.glued_lparen());
        // consume through ')'
        for _ in 0..3 {
            lx.next_token().unwrap();
        }
        assert_eq!(lx.next_token().unwrap(), Token::Word("FOO".to_string()));
        assert!(!lx.glued_lparen());
    }

    #[test]
    fn push_back_redelivers() {
        let mut lx = Lexer::new("x y", "test.h");
        assert_eq!(lx.next_token().unwrap(), Token::Word("x".to_string()));
        lx.push_back();
        assert_eq!(lx.next_token().unwrap(), Token::Word("x".to_string()));
        assert_eq!(lx.next_token().unwrap(), Token::Word("y".to_string()));
    }
}
