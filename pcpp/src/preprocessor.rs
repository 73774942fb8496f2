use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::config::PreprocessorConfig;
use crate::defines::{DefineTable, Macro};
use crate::error::PreprocessError;
use crate::lexer::Lexer;
use crate::token::{Token, is_identifier, is_number};

/// One `#if`-family nesting level.
///
/// `live` is the AND of this branch's own test with every enclosing `live`
/// bit: whether code here is currently emitted. `condition` remembers
/// whether any branch of this chain has fired yet, so a later `#elif` or
/// `#else` knows it must stay dark.
#[derive(Clone, Copy, Debug)]
struct CondFrame {
    condition: bool,
    live: bool,
}

/// Per-file parse state, one per nested `#include` level. The includer's
/// state lives in the caller's stack frame while the included file is
/// processed, so resuming after the include is automatic.
struct ParseState {
    lexer: Lexer,
    start_of_line: bool,
    start_of_file: bool,
    last_was_eol: bool,
}

impl ParseState {
    fn new(lexer: Lexer) -> Self {
        ParseState {
            lexer,
            start_of_line: true,
            start_of_file: true,
            last_was_eol: false,
        }
    }

    fn loc(&self) -> (String, usize) {
        (self.lexer.filename().to_string(), self.lexer.line())
    }
}

/// A minimal pseudo-C-preprocessor designed in particular to preserve
/// `#define` statements defining constants so they can be observed by a
/// glue-code generator.
///
/// Definition and macro tables persist for the lifetime of the instance and
/// are never rolled back when a conditional block closes, matching real C
/// semantics. One instance processes one root file (plus its transitive
/// includes) per [`run`](Preprocessor::run) call; independent instances
/// share nothing and may run on separate threads.
pub struct Preprocessor {
    tables: DefineTable,
    include_paths: Vec<PathBuf>,
    cond_stack: Vec<CondFrame>,
    out: Box<dyn Write>,
    line_buf: String,
    debug: bool,
    echo_to_stderr: bool,
    trace_indent: usize,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    /// Create a preprocessor with no include paths, writing to stdout.
    #[must_use]
    pub fn new() -> Self {
        Preprocessor {
            tables: DefineTable::new(),
            include_paths: Vec::new(),
            cond_stack: Vec::new(),
            out: Box::new(io::stdout()),
            line_buf: String::new(),
            debug: false,
            echo_to_stderr: false,
            trace_indent: 0,
        }
    }

    /// Create a preprocessor from a configuration.
    #[must_use]
    pub fn with_config(config: &PreprocessorConfig) -> Self {
        let mut pp = Self::new();
        pp.include_paths = config.include_paths.clone();
        pp.debug = config.debug;
        pp.echo_to_stderr = config.echo_to_stderr;
        pp
    }

    /// Replace the output sink. May be called between runs.
    pub fn set_output(&mut self, out: Box<dyn Write>) {
        self.out = out;
    }

    /// Check whether `name` currently has an object-like definition.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.tables.is_defined(name)
    }

    /// The current object-like definition map.
    #[must_use]
    pub fn defines(&self) -> &std::collections::HashMap<String, String> {
        self.tables.defines()
    }

    /// Seed a definition before a run, the way a driver injects
    /// compiler-builtin constants. The value is classified exactly like a
    /// parsed one-value `#define`, so constants are re-emitted for the
    /// downstream parser.
    ///
    /// # Errors
    /// Propagates output-sink I/O failures.
    pub fn predefine(&mut self, name: &str, value: &str) -> Result<(), PreprocessError> {
        self.add_define(name, false, Vec::new(), vec![value.to_string()], "<predefined>", 0)
    }

    /// Resolve `filename` against the include search path, first match wins.
    #[must_use]
    pub fn find_file(&self, filename: &str) -> Option<PathBuf> {
        self.include_paths
            .iter()
            .map(|dir| dir.join(filename))
            .find(|candidate| candidate.exists())
    }

    /// Process `input` under the logical name `filename`, writing the
    /// preprocessed stream to the configured sink.
    ///
    /// # Errors
    /// Returns `PreprocessError` on any fatal condition: mismatched
    /// conditionals, malformed `#if` expressions, unresolvable includes,
    /// `#error` directives, malformed literals, or sink I/O failures. The
    /// unflushed portion of the output is discarded.
    pub fn run(&mut self, input: &str, filename: &str) -> Result<(), PreprocessError> {
        let mut st = ParseState::new(Lexer::new(input, filename));
        let mut result = self.line_directive(&st);
        if result.is_ok() {
            result = self.parse(&mut st);
        }
        if result.is_err() {
            self.line_buf.clear();
        }
        result
    }

    // ------------------------------------------------------------------
    // Main token loop
    // ------------------------------------------------------------------

    fn parse(&mut self, st: &mut ParseState) -> Result<(), PreprocessError> {
        loop {
            let tok = self.next_token(st, false)?;
            if tok == Token::Eof {
                break;
            }
            // A '#' at the beginning of a line is a preprocessor directive.
            if st.start_of_line && tok == Token::Punct('#') {
                self.directive(st)?;
            } else {
                self.expand_and_emit(st, &tok)?;
            }
        }
        self.flush()
    }

    /// Fetch the next token, maintaining start-of-line state. Unless
    /// `return_eols` is set, EOL tokens are consumed here, each one echoed
    /// as a newline in the output. If fetching crossed more than one source
    /// line (block comment, spliced continuation) a line marker is re-issued
    /// so downstream positions stay accurate.
    fn next_token(
        &mut self,
        st: &mut ParseState,
        return_eols: bool,
    ) -> Result<Token, PreprocessError> {
        let line_before = st.lexer.line();
        if st.last_was_eol {
            st.start_of_line = true;
        } else if !st.start_of_file {
            st.start_of_line = false;
        }
        st.start_of_file = false;

        let mut tok = st.lexer.next_token()?;
        if !return_eols {
            while tok == Token::Eol {
                tok = st.lexer.next_token()?;
                st.start_of_line = true;
                self.println()?;
            }
        }
        st.last_was_eol = tok == Token::Eol;
        if st.lexer.line() > line_before + 1 {
            self.line_directive(st)?;
        }
        Ok(tok)
    }

    fn next_word(
        &mut self,
        st: &mut ParseState,
        context: &'static str,
    ) -> Result<String, PreprocessError> {
        let (file, line) = st.loc();
        match self.next_token(st, false)? {
            Token::Word(w) => Ok(w),
            Token::Eof => Err(PreprocessError::UnexpectedEof { file, line, context }),
            tok => Err(PreprocessError::UnexpectedToken {
                file,
                line,
                token: tok.text(),
                context,
            }),
        }
    }

    fn require_punct(
        &mut self,
        st: &mut ParseState,
        expected: char,
    ) -> Result<(), PreprocessError> {
        let tok = self.next_token(st, false)?;
        if tok == Token::Punct(expected) {
            Ok(())
        } else {
            let (file, line) = st.loc();
            Err(PreprocessError::ExpectedToken {
                file,
                line,
                expected,
                found: tok.text(),
            })
        }
    }

    /// Consume and join the remaining tokens on the current line.
    fn rest_of_line(&mut self, st: &mut ParseState) -> Result<String, PreprocessError> {
        let mut parts: Vec<String> = Vec::new();
        loop {
            match self.next_token(st, true)? {
                Token::Eol | Token::Eof => break,
                tok => parts.push(tok.text()),
            }
        }
        Ok(parts.join(" "))
    }

    // ------------------------------------------------------------------
    // Directive dispatch
    // ------------------------------------------------------------------

    fn directive(&mut self, st: &mut ParseState) -> Result<(), PreprocessError> {
        let word = self.next_word(st, "a preprocessor directive")?;
        match word.as_str() {
            "warning" => self.handle_warning(st),
            "error" => self.handle_error(st),
            "define" => self.handle_define(st),
            "undef" => self.handle_undef(st),
            "if" => self.handle_if(st, true),
            "elif" => self.handle_if(st, false),
            "ifdef" => self.handle_ifdef(st, true),
            "ifndef" => self.handle_ifdef(st, false),
            "else" => self.handle_else(st),
            "endif" => self.handle_endif(st),
            "include" => self.handle_include(st),
            _ => {
                if let Ok(line_no) = word.parse::<i64>() {
                    // GNU line marker '# <line> "<file>"': re-emit verbatim.
                    let fname = self.next_word_or_string(st, "a line-marker filename")?;
                    self.print(&format!("# {line_no} {fname}"));
                    self.println()
                } else {
                    // Unknown directive (#pragma and friends): pass through
                    // prefixed; the rest of the line flows out via the
                    // normal token path.
                    self.print("# ");
                    self.print(&word);
                    Ok(())
                }
            }
        }
    }

    fn next_word_or_string(
        &mut self,
        st: &mut ParseState,
        context: &'static str,
    ) -> Result<String, PreprocessError> {
        let (file, line) = st.loc();
        match self.next_token(st, false)? {
            tok @ (Token::Word(_) | Token::Quoted { .. }) => Ok(tok.text()),
            Token::Eof => Err(PreprocessError::UnexpectedEof { file, line, context }),
            tok => Err(PreprocessError::UnexpectedToken {
                file,
                line,
                token: tok.text(),
                context,
            }),
        }
    }

    fn handle_warning(&mut self, st: &mut ParseState) -> Result<(), PreprocessError> {
        let (file, line) = st.loc();
        let message = self.rest_of_line(st)?;
        if self.enabled() {
            warn!("{file}:{line}: #warning {message}");
        }
        Ok(())
    }

    fn handle_error(&mut self, st: &mut ParseState) -> Result<(), PreprocessError> {
        let (file, line) = st.loc();
        let message = self.rest_of_line(st)?;
        if self.enabled() {
            Err(PreprocessError::ErrorDirective { file, line, message })
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // #define / #undef
    // ------------------------------------------------------------------

    fn handle_define(&mut self, st: &mut ParseState) -> Result<(), PreprocessError> {
        let name = self.next_word(st, "a #define name")?;
        // Function-like only when '(' is glued to the name.
        let is_macro = st.lexer.glued_lparen();
        let mut params: Vec<String> = Vec::new();
        if is_macro {
            self.require_punct(st, '(')?;
            loop {
                let (file, line) = st.loc();
                match self.next_token(st, true)? {
                    Token::Punct(')') => break,
                    Token::Punct(',') => {}
                    Token::Word(w) => params.push(w),
                    Token::Eof => {
                        return Err(PreprocessError::UnexpectedEof {
                            file,
                            line,
                            context: "a macro parameter list",
                        });
                    }
                    tok => {
                        return Err(PreprocessError::UnexpectedToken {
                            file,
                            line,
                            token: tok.text(),
                            context: "a macro parameter list",
                        });
                    }
                }
            }
        }
        let mut values: Vec<String> = Vec::new();
        loop {
            match self.next_token(st, true)? {
                Token::Eol | Token::Eof => break,
                tok => values.push(tok.text()),
            }
        }
        let (file, line) = st.loc();
        self.trace(true, &file, line, &format!("DEFINE {name}"));
        self.add_define(&name, is_macro, params, values, &file, line)
    }

    /// Classify and record one definition. Shared by `#define` handling and
    /// [`predefine`](Preprocessor::predefine). Mutates nothing while inside
    /// a disabled conditional branch. Constant definitions are re-emitted as
    /// `# define NAME VALUE` so the downstream parser can collect them.
    fn add_define(
        &mut self,
        name: &str,
        is_macro: bool,
        params: Vec<String>,
        mut values: Vec<String>,
        file: &str,
        line: usize,
    ) -> Result<(), PreprocessError> {
        if !self.enabled() {
            return Ok(());
        }
        let mut emit = true;

        if is_macro {
            let mac = Macro {
                params,
                body: values,
            };
            if self.tables.insert_macro(name, mac).is_some() {
                warn!("{file}:{line}: macro \"{name}\" redefined");
            }
            return Ok(());
        }

        match values.len() {
            0 => {
                // Definition to nothing, like `#define FOO`. Not re-emitted:
                // it carries no value for the parser.
                if let Some(old) = self.tables.insert(name, String::new()) {
                    if !old.is_empty() {
                        warn!("{file}:{line}: \"{name}\" redefined from \"{old}\" to \"\"");
                    }
                }
                emit = false;
            }
            1 => {
                let value = values[0].clone();
                if is_number(&value) {
                    // Numeric constant like `#define FOO 5`.
                    if let Some(old) = self.tables.insert(name, value.clone()) {
                        if old != value {
                            warn!(
                                "{file}:{line}: \"{name}\" redefined from \"{old}\" to \"{value}\""
                            );
                        }
                    }
                } else {
                    // Symbolic value like `#define FOO BAR`: chase the
                    // definition chain.
                    match self.tables.resolve(&value, true) {
                        Some(resolved) => {
                            if resolved.contains('(') {
                                // Resolved to a macro invocation; the
                                // downstream parser can't digest that.
                                emit = false;
                            } else {
                                values[0] = resolved;
                            }
                        }
                        None => {
                            // Unresolvable: keep it for textual substitution
                            // only.
                            self.tables.insert(name, value);
                            self.tables.mark_non_constant(name);
                            emit = false;
                        }
                    }
                }
            }
            _ => {
                let has_identifier = values.iter().any(|v| is_identifier(v));
                if has_identifier {
                    // Expression containing identifiers: substitute what we
                    // can and carry it as text.
                    let text = values
                        .iter()
                        .map(|v| self.tables.resolve(v, false).unwrap_or_else(|| v.clone()))
                        .collect::<Vec<_>>()
                        .join(" ");
                    if self.tables.is_defined(name) && !self.tables.is_non_constant(name) {
                        return Err(PreprocessError::ConstantRedefined {
                            file: file.to_string(),
                            line,
                            name: name.to_string(),
                            value: text,
                        });
                    }
                    self.tables.insert(name, text);
                    self.tables.mark_non_constant(name);
                    emit = false;
                } else {
                    // Constant expression like `(1 << 3)`: pass it through.
                    let text = values.concat();
                    if let Some(old) = self.tables.insert(name, text.clone()) {
                        if old != text {
                            warn!(
                                "{file}:{line}: \"{name}\" redefined from \"{old}\" to \"{text}\""
                            );
                        }
                    }
                }
            }
        }

        if emit {
            self.print("# define ");
            self.print(name);
            self.print(" ");
            let joined = values.concat();
            self.print(&joined);
            self.println()?;
        }
        Ok(())
    }

    fn handle_undef(&mut self, st: &mut ParseState) -> Result<(), PreprocessError> {
        let name = self.next_word(st, "an #undef name")?;
        let (file, line) = st.loc();
        // There shouldn't be anything after the name, but consume the line
        // to stay synchronized.
        let _ = self.rest_of_line(st)?;
        if self.enabled() {
            if self.tables.remove(&name).is_none() {
                warn!(
                    "{file}:{line}: ignoring redundant \"#undef {name}\" - was not previously defined"
                );
            }
        } else {
            info!("{file}:{line}: skipping #undef of \"{name}\" in disabled block");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Conditionals
    // ------------------------------------------------------------------

    fn enabled(&self) -> bool {
        self.cond_stack.last().map_or(true, |frame| frame.live)
    }

    fn push_frame(&mut self, frame: CondFrame) {
        self.cond_stack.push(frame);
        self.trace_indent += 1;
    }

    fn pop_frame(&mut self, st: &ParseState) -> Result<CondFrame, PreprocessError> {
        self.trace_indent = self.trace_indent.saturating_sub(1);
        self.cond_stack.pop().ok_or_else(|| {
            let (file, line) = st.loc();
            PreprocessError::MismatchedConditional { file, line }
        })
    }

    fn handle_ifdef(&mut self, st: &mut ParseState, is_ifdef: bool) -> Result<(), PreprocessError> {
        let symbol = self.next_word(st, "an #ifdef symbol")?;
        let outside = self.enabled();
        let defined = self.tables.is_defined(&symbol);
        let (file, line) = st.loc();
        self.trace(
            false,
            &file,
            line,
            &format!(
                "{} {symbol}, outside {outside}, defined {defined}",
                if is_ifdef { "IFDEF" } else { "IFNDEF" }
            ),
        );
        let live = outside && (defined == is_ifdef);
        self.push_frame(CondFrame {
            condition: live,
            live,
        });
        Ok(())
    }

    /// `#if` and `#elif`. The expression is always parsed, even inside a
    /// dead branch or an already-resolved chain, to keep the token stream
    /// position correct.
    fn handle_if(&mut self, st: &mut ParseState, is_if: bool) -> Result<(), PreprocessError> {
        let already_fired = if is_if {
            false
        } else {
            self.pop_frame(st)?.condition
        };
        let outside = self.enabled();
        let value = self.eval_if_expr(st, true)?;
        let (file, line) = st.loc();
        self.trace(
            false,
            &file,
            line,
            &format!(
                "{}, outside {outside}, eval {value}",
                if is_if { "IF" } else { "ELIF" }
            ),
        );
        let live = outside && !already_fired && value;
        self.push_frame(CondFrame {
            condition: already_fired || live,
            live,
        });
        Ok(())
    }

    fn handle_else(&mut self, st: &mut ParseState) -> Result<(), PreprocessError> {
        let frame = self.pop_frame(st)?;
        let outside = self.enabled();
        let (file, line) = st.loc();
        self.trace(false, &file, line, &format!("ELSE, outside {outside}"));
        let live = outside && !frame.condition;
        self.push_frame(CondFrame {
            condition: live,
            live,
        });
        Ok(())
    }

    fn handle_endif(&mut self, st: &mut ParseState) -> Result<(), PreprocessError> {
        self.pop_frame(st)?;
        let (file, line) = st.loc();
        self.trace(false, &file, line, "ENDIF");
        Ok(())
    }

    // ------------------------------------------------------------------
    // #if expression evaluation
    // ------------------------------------------------------------------

    /// Recursive evaluation of an `#if`/`#elif` expression, greedy by
    /// default: sub-expressions are consumed left to right, tracking paren
    /// balance, until end of line. Non-greedy mode (`!`) evaluates exactly
    /// one operand. `&&`/`||` always scan both sides so the token stream
    /// stays synchronized; relational operators parse their right-hand side
    /// but always evaluate false, a fail-closed approximation that real
    /// headers depend on for version guards.
    fn eval_if_expr(
        &mut self,
        st: &mut ParseState,
        greedy: bool,
    ) -> Result<bool, PreprocessError> {
        let mut value = true;
        let mut open_parens: i32 = 0;
        loop {
            let tok = self.next_token(st, true)?;
            match &tok {
                Token::Punct('(') => {
                    open_parens += 1;
                    let inner = self.eval_if_expr(st, true)?;
                    value = value && inner;
                }
                Token::Punct(')') => {
                    open_parens -= 1;
                }
                Token::Punct('!') => {
                    let rhs = self.eval_if_expr(st, false)?;
                    value = !rhs;
                }
                Token::Punct('&') => {
                    self.require_punct(st, '&')?;
                    let rhs = self.eval_if_expr(st, true)?;
                    value = value && rhs;
                }
                Token::Punct('|') => {
                    self.require_punct(st, '|')?;
                    let rhs = self.eval_if_expr(st, true)?;
                    value = value || rhs;
                }
                Token::Punct('>' | '<' | '=') => {
                    let _rhs = self.eval_if_expr(st, true)?;
                    value = false;
                }
                Token::Punct('*' | '+') => {
                    let _rhs = self.eval_if_expr(st, false)?;
                    value = false;
                }
                Token::Word(word) => {
                    if word == "defined" {
                        self.require_punct(st, '(')?;
                        let symbol = self.next_word(st, "a defined() symbol")?;
                        self.require_punct(st, ')')?;
                        let is_def = self.tables.is_defined(&symbol);
                        value = value && is_def;
                    } else if self.tables.is_defined(word) {
                        // A defined symbol is true only when it resolved to
                        // a constant; unresolved symbolic defines read false.
                        return Ok(!self.tables.is_non_constant(word));
                    } else {
                        return Ok(word_truth(word));
                    }
                }
                Token::Eol => {
                    // Push back so every recursion level sees the EOL.
                    st.lexer.push_back();
                }
                Token::Eof => {
                    let (file, line) = st.loc();
                    return Err(PreprocessError::UnexpectedEof {
                        file,
                        line,
                        context: "an #if expression",
                    });
                }
                other => {
                    let (file, line) = st.loc();
                    return Err(PreprocessError::UnexpectedToken {
                        file,
                        line,
                        token: other.text(),
                        context: "an #if expression",
                    });
                }
            }
            if !(greedy && open_parens >= 0 && tok != Token::Eol) {
                break;
            }
        }
        Ok(value)
    }

    // ------------------------------------------------------------------
    // #include
    // ------------------------------------------------------------------

    fn handle_include(&mut self, st: &mut ParseState) -> Result<(), PreprocessError> {
        let (file, line) = st.loc();
        let name = match self.next_token(st, false)? {
            Token::Quoted { quote: '"', body } => body,
            Token::Punct('<') => {
                // Path components arrive as separate tokens; concatenate
                // them up to the closing '>'.
                let mut buf = String::new();
                loop {
                    match self.next_token(st, false)? {
                        Token::Punct('>') => break,
                        Token::Eof => {
                            return Err(PreprocessError::UnexpectedEof {
                                file,
                                line,
                                context: "an #include filename",
                            });
                        }
                        tok => buf.push_str(&tok.text()),
                    }
                }
                buf
            }
            tok => {
                return Err(PreprocessError::UnexpectedToken {
                    file,
                    line,
                    token: tok.text(),
                    context: "an #include filename",
                });
            }
        };
        self.trace(true, &file, line, &format!("INCLUDE [{name}]"));
        // Inside a disabled block the filename is parsed but never opened.
        if self.enabled() {
            let Some(full) = self.find_file(&name) else {
                return Err(PreprocessError::IncludeNotFound { file, line, name });
            };
            let content = fs::read_to_string(&full)?;
            self.run(&content, &full.to_string_lossy())?;
            // Re-sync the includer's position now that control is back.
            self.line_directive(st)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Macro expansion
    // ------------------------------------------------------------------

    fn expand_and_emit(&mut self, st: &mut ParseState, tok: &Token) -> Result<(), PreprocessError> {
        // Space only before word tokens, so multi-character operators such
        // as == and != print intact.
        if matches!(tok, Token::Word(_)) {
            self.print(" ");
        }
        let text = tok.text();
        let substituted = match self.tables.get(&text) {
            Some(value) => value.to_string(),
            None => text,
        };
        if let Some(mac) = self.tables.get_macro(&substituted).cloned() {
            let expanded = self.expand_macro(st, &substituted, &mac)?;
            self.print(&expanded);
        } else {
            self.print(&substituted);
        }
        Ok(())
    }

    /// Consume a macro invocation's argument list and rebuild its body.
    /// Arguments run to the next bare `)`; nested parentheses are not
    /// counted. Expanded pieces are joined with single spaces so substituted
    /// arguments and identifier-shaped body tokens never glue together.
    fn expand_macro(
        &mut self,
        st: &mut ParseState,
        name: &str,
        mac: &Macro,
    ) -> Result<String, PreprocessError> {
        let mut args: Vec<String> = Vec::new();
        loop {
            let (file, line) = st.loc();
            match self.next_token(st, false)? {
                Token::Punct(')') => break,
                Token::Punct('(' | ',') => {}
                Token::Eof => {
                    return Err(PreprocessError::UnexpectedEof {
                        file,
                        line,
                        context: "macro arguments",
                    });
                }
                tok => args.push(tok.text()),
            }
        }
        let mut pieces: Vec<String> = Vec::with_capacity(mac.body.len());
        for body_tok in &mac.body {
            match mac.params.iter().position(|p| p == body_tok) {
                Some(idx) => match args.get(idx) {
                    Some(arg) => pieces.push(arg.clone()),
                    None => {
                        let (file, line) = st.loc();
                        return Err(PreprocessError::MacroArgMismatch {
                            file,
                            line,
                            name: name.to_string(),
                        });
                    }
                },
                None => pieces.push(body_tok.clone()),
            }
        }
        Ok(pieces.join(" "))
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    fn print(&mut self, s: &str) {
        if self.enabled() {
            self.line_buf.push_str(s);
            if self.echo_to_stderr {
                eprint!("{s}");
            }
        }
    }

    fn println(&mut self) -> Result<(), PreprocessError> {
        if self.enabled() {
            self.line_buf.push('\n');
            if self.echo_to_stderr {
                eprintln!();
            }
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PreprocessError> {
        if !self.line_buf.is_empty() {
            self.out.write_all(self.line_buf.as_bytes())?;
            self.line_buf.clear();
        }
        self.out.flush()?;
        Ok(())
    }

    fn line_directive(&mut self, st: &ParseState) -> Result<(), PreprocessError> {
        let (file, line) = st.loc();
        self.print(&format!("# {line} \"{file}\""));
        self.println()
    }

    fn trace(&self, only_if_enabled: bool, file: &str, line: usize, msg: &str) {
        if !self.debug {
            return;
        }
        if only_if_enabled && !self.enabled() {
            return;
        }
        debug!(
            "{:indent$}STATE: {msg} (line {line} file {file})",
            "",
            indent = self.trace_indent * 2
        );
    }
}

/// Truth value of a bare, undefined word in an `#if`: decimal parse first,
/// then integer, then the boolean literal `true`; anything else is false.
fn word_truth(word: &str) -> bool {
    if let Ok(v) = word.parse::<f64>() {
        return v != 0.0;
    }
    if let Ok(v) = word.parse::<i64>() {
        return v != 0;
    }
    word.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_truth_parses_in_order() {
        assert!(word_truth("1"));
        assert!(word_truth("0.5"));
        assert!(!word_truth("0"));
        assert!(!word_truth("0.0"));
        assert!(word_truth("true"));
        assert!(word_truth("TRUE"));
        assert!(!word_truth("0x10")); // hex is not parsed here
        assert!(!word_truth("BANANA"));
    }

    #[test]
    fn find_file_searches_in_order() {
        let pp = Preprocessor::with_config(
            &crate::PreprocessorConfig::new()
                .with_include_path("/nonexistent-a")
                .with_include_path("/nonexistent-b"),
        );
        assert!(pp.find_file("stdio.h").is_none());
    }
}
