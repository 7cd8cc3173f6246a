//! Statement splitting.
//!
//! A raw script is one text blob; databases execute one statement at a time.
//! [`DelimiterConfig`] describes the dialect's statement terminator and
//! [`DelimiterConfig::split`] turns a script body into an ordered list of
//! executable statements, skipping delimiter characters that appear inside
//! string literals, quoted identifiers, and comments.
//!
//! Two terminator styles exist in the wild:
//!
//! - boundary delimiters (`;` for most dialects): any occurrence outside a
//!   literal or comment ends the statement;
//! - own-line delimiters (`/` for procedural blocks): the delimiter ends a
//!   statement only when it sits alone on its own line, so semicolons inside
//!   `BEGIN...END` blocks are ordinary content.

use schemup_core::{SchemupError, SchemupResult};

/// Scanner state while walking script text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    SingleQuote,
    DoubleQuote,
    LineComment,
    BlockComment,
}

/// Statement delimiter rules for one database dialect.
///
/// Immutable once constructed; splitting is pure and re-runnable on the same
/// input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterConfig {
    delimiter: char,
    requires_own_line: bool,
}

impl Default for DelimiterConfig {
    fn default() -> Self {
        Self::semicolon()
    }
}

impl DelimiterConfig {
    /// Creates a delimiter configuration, validating the delimiter character.
    ///
    /// # Errors
    ///
    /// Returns [`SchemupError::Split`] if the delimiter is whitespace,
    /// alphanumeric, or a quote character, since none of those can mark a
    /// statement boundary unambiguously.
    pub fn new(delimiter: char, requires_own_line: bool) -> SchemupResult<Self> {
        if delimiter.is_whitespace() || delimiter.is_alphanumeric() {
            return Err(SchemupError::Split(format!(
                "'{delimiter}' cannot be used as a statement delimiter"
            )));
        }
        if delimiter == '\'' || delimiter == '"' {
            return Err(SchemupError::Split(
                "quote characters cannot be used as statement delimiters".into(),
            ));
        }
        Ok(Self {
            delimiter,
            requires_own_line,
        })
    }

    /// The common `;` boundary delimiter.
    pub fn semicolon() -> Self {
        Self {
            delimiter: ';',
            requires_own_line: false,
        }
    }

    /// An own-line delimiter such as the `/` terminator for procedural
    /// blocks: the character ends a statement only when it is alone on a
    /// line, and embedded `;` characters are left untouched.
    pub fn standalone(delimiter: char) -> SchemupResult<Self> {
        Self::new(delimiter, true)
    }

    /// Returns the delimiter character.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Returns whether the delimiter must sit alone on its own line.
    pub fn requires_own_line(&self) -> bool {
        self.requires_own_line
    }

    /// Splits a script body into trimmed, non-empty statements in source
    /// order. Trailing content with no terminating delimiter is emitted as a
    /// final statement; a whitespace-only script yields no statements.
    pub fn split(&self, body: &str) -> Vec<String> {
        if self.requires_own_line {
            self.split_own_line(body)
        } else {
            self.split_at_boundaries(body)
        }
    }

    fn split_at_boundaries(&self, body: &str) -> Vec<String> {
        let mut statements = Vec::new();
        let mut current = String::new();
        let mut state = ScanState::Normal;
        let mut chars = body.chars().peekable();

        while let Some(c) = chars.next() {
            match state {
                ScanState::Normal => {
                    if c == self.delimiter {
                        push_statement(&mut statements, &mut current);
                        continue;
                    }
                    match c {
                        '\'' => state = ScanState::SingleQuote,
                        '"' => state = ScanState::DoubleQuote,
                        '-' if chars.peek() == Some(&'-') => {
                            current.push(c);
                            current.push(chars.next().unwrap_or('-'));
                            state = ScanState::LineComment;
                            continue;
                        }
                        '/' if chars.peek() == Some(&'*') => {
                            current.push(c);
                            current.push(chars.next().unwrap_or('*'));
                            state = ScanState::BlockComment;
                            continue;
                        }
                        _ => {}
                    }
                    current.push(c);
                }
                ScanState::SingleQuote => {
                    current.push(c);
                    if c == '\'' {
                        state = ScanState::Normal;
                    }
                }
                ScanState::DoubleQuote => {
                    current.push(c);
                    if c == '"' {
                        state = ScanState::Normal;
                    }
                }
                ScanState::LineComment => {
                    current.push(c);
                    if c == '\n' {
                        state = ScanState::Normal;
                    }
                }
                ScanState::BlockComment => {
                    current.push(c);
                    if c == '*' && chars.peek() == Some(&'/') {
                        current.push(chars.next().unwrap_or('/'));
                        state = ScanState::Normal;
                    }
                }
            }
        }

        push_statement(&mut statements, &mut current);
        statements
    }

    fn split_own_line(&self, body: &str) -> Vec<String> {
        let delimiter_line = self.delimiter.to_string();
        let mut statements = Vec::new();
        let mut current = String::new();
        let mut state = ScanState::Normal;

        for line in body.lines() {
            if state == ScanState::Normal && line.trim() == delimiter_line {
                push_statement(&mut statements, &mut current);
                continue;
            }
            current.push_str(line);
            current.push('\n');
            state = advance_line_state(state, line);
        }

        push_statement(&mut statements, &mut current);
        statements
    }
}

/// Trims the accumulated buffer and emits it as a statement if non-empty.
fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}

/// Advances quote/comment state across one line of script text.
///
/// Line comments never span lines, so the returned state is only ever
/// `Normal`, `SingleQuote`, `DoubleQuote`, or `BlockComment`.
fn advance_line_state(state: ScanState, line: &str) -> ScanState {
    let mut state = state;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            ScanState::Normal => match c {
                '\'' => state = ScanState::SingleQuote,
                '"' => state = ScanState::DoubleQuote,
                // Rest of the line is a comment; nothing in it can change state.
                '-' if chars.peek() == Some(&'-') => return state,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = ScanState::BlockComment;
                }
                _ => {}
            },
            ScanState::SingleQuote => {
                if c == '\'' {
                    state = ScanState::Normal;
                }
            }
            ScanState::DoubleQuote => {
                if c == '"' {
                    state = ScanState::Normal;
                }
            }
            ScanState::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = ScanState::Normal;
                }
            }
            ScanState::LineComment => return ScanState::Normal,
        }
    }

    state
}
