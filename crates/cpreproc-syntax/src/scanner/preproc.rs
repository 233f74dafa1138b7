//! The C preprocessor scanner.
//!
//! Recognizes logical line ends inside directives, directive starts at the
//! beginning of a logical line, `#`/`##` inside `#define` bodies, directive
//! arguments, `<...>` include paths and the parameter-list parenthesis of a
//! function-like macro.

use super::{Cursor, ExternalScanner, ExternalState, ValidSymbols};
use crate::syntax::SyntaxKind;

const DIRECTIVES: &[(&str, SyntaxKind)] = &[
    ("include", SyntaxKind::DirInclude),
    ("include_next", SyntaxKind::DirIncludeNext),
    ("define", SyntaxKind::DirDefine),
    ("undef", SyntaxKind::DirUndef),
    ("if", SyntaxKind::DirIf),
    ("ifdef", SyntaxKind::DirIfdef),
    ("ifndef", SyntaxKind::DirIfndef),
    ("elif", SyntaxKind::DirElif),
    ("elifdef", SyntaxKind::DirElifdef),
    ("elifndef", SyntaxKind::DirElifndef),
    ("else", SyntaxKind::DirElse),
    ("endif", SyntaxKind::DirEndif),
    ("line", SyntaxKind::DirLine),
    ("error", SyntaxKind::DirError),
    ("eval", SyntaxKind::DirEval),
    ("endeval", SyntaxKind::DirEndeval),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Other = 0,
    Define = 1,
}

/// Scanner state: whether a directive line is open and which kind it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocScanner {
    in_directive: bool,
    mode: Mode,
}

impl PreprocScanner {
    /// Creates a scanner in its initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn finish(kind: SyntaxKind) -> Option<usize> {
        kind.external_index()
    }

    fn scan_line_end(&mut self, cursor: &mut Cursor<'_>) -> Option<usize> {
        match cursor.lookahead() {
            None => {}
            Some('\n') => cursor.advance(),
            Some('\r') if cursor.lookahead_nth(1) == Some('\n') => {
                cursor.advance();
                cursor.advance();
            }
            Some(_) => return None,
        }
        cursor.mark_end();
        self.in_directive = false;
        self.mode = Mode::Other;
        Self::finish(SyntaxKind::DirectiveEnd)
    }

    fn scan_directive(&mut self, cursor: &mut Cursor<'_>) -> Option<usize> {
        cursor.advance();
        cursor.mark_end();
        while matches!(cursor.lookahead(), Some(' ' | '\t')) {
            cursor.advance();
        }

        let kind = match cursor.lookahead() {
            // GNU line marker: `# 12 "file.c" 1`
            Some(c) if c.is_ascii_digit() => SyntaxKind::DirLine,
            Some(c) if is_name_char(c) => {
                let start = cursor.position();
                let mut name = String::new();
                while let Some(c) = cursor.lookahead().filter(|c| is_name_char(*c)) {
                    name.push(c);
                    cursor.advance();
                }
                debug_assert!(cursor.position() > start);
                cursor.mark_end();
                DIRECTIVES
                    .iter()
                    .find(|(known, _)| *known == name)
                    .map_or(SyntaxKind::PreprocDirective, |(_, kind)| *kind)
            }
            // Null directive, or `#` followed by something that is not a name.
            _ => SyntaxKind::PreprocDirective,
        };

        self.in_directive = true;
        self.mode = if kind == SyntaxKind::DirDefine {
            Mode::Define
        } else {
            Mode::Other
        };
        Self::finish(kind)
    }

    fn scan_hash_operator(cursor: &mut Cursor<'_>, valid: ValidSymbols) -> Option<usize> {
        if cursor.lookahead_nth(1) == Some('#') {
            if !valid.contains_kind(SyntaxKind::TokenPaste) {
                return None;
            }
            cursor.advance();
            cursor.advance();
            cursor.mark_end();
            return Self::finish(SyntaxKind::TokenPaste);
        }
        if !valid.contains_kind(SyntaxKind::Stringify) {
            return None;
        }
        cursor.advance();
        cursor.mark_end();
        Self::finish(SyntaxKind::Stringify)
    }

    fn scan_arg(cursor: &mut Cursor<'_>) -> Option<usize> {
        match cursor.lookahead() {
            None | Some(' ' | '\t' | '\r' | '\n' | '\x0B' | '\x0C') => return None,
            Some('\\') if matches!(cursor.lookahead_nth(1), Some('\n' | '\r')) => return None,
            Some('/') if matches!(cursor.lookahead_nth(1), Some('/' | '*')) => return None,
            Some(_) => {}
        }

        loop {
            match cursor.lookahead() {
                None | Some('\n') => break,
                Some('\r') if cursor.lookahead_nth(1) == Some('\n') => break,
                Some('/') if matches!(cursor.lookahead_nth(1), Some('/' | '*')) => break,
                Some('\\') if cursor.lookahead_nth(1) == Some('\n') => {
                    cursor.advance();
                    cursor.advance();
                }
                Some('\\')
                    if cursor.lookahead_nth(1) == Some('\r')
                        && cursor.lookahead_nth(2) == Some('\n') =>
                {
                    cursor.advance();
                    cursor.advance();
                    cursor.advance();
                }
                Some(' ' | '\t' | '\r' | '\x0B' | '\x0C') => cursor.advance(),
                Some(_) => {
                    cursor.advance();
                    cursor.mark_end();
                }
            }
        }
        Self::finish(SyntaxKind::PreprocArg)
    }

    fn scan_system_lib_string(cursor: &mut Cursor<'_>) -> Option<usize> {
        cursor.advance();
        loop {
            match cursor.lookahead() {
                None | Some('\n') => return None,
                Some('\\') if cursor.lookahead_nth(1) == Some('>') => {
                    cursor.advance();
                    cursor.advance();
                }
                Some('>') => {
                    cursor.advance();
                    cursor.mark_end();
                    return Self::finish(SyntaxKind::SystemLibString);
                }
                Some(_) => cursor.advance(),
            }
        }
    }
}

impl ExternalScanner for PreprocScanner {
    fn scan(&mut self, cursor: &mut Cursor<'_>, valid: ValidSymbols) -> Option<usize> {
        if self.in_directive && valid.contains_kind(SyntaxKind::DirectiveEnd) {
            if let Some(index) = self.scan_line_end(cursor) {
                return Some(index);
            }
        }

        let c = cursor.lookahead()?;

        if c == '#' && !self.in_directive && cursor.at_line_start() {
            return self.scan_directive(cursor);
        }

        if !self.in_directive {
            return None;
        }

        if c == '#' && self.mode == Mode::Define {
            if let Some(index) = Self::scan_hash_operator(cursor, valid) {
                return Some(index);
            }
        }

        if valid.contains_kind(SyntaxKind::PreprocArg) {
            return Self::scan_arg(cursor);
        }

        if c == '<' && valid.contains_kind(SyntaxKind::SystemLibString) {
            return Self::scan_system_lib_string(cursor);
        }

        if c == '('
            && valid.contains_kind(SyntaxKind::ParamsOpen)
            && cursor
                .prev_byte()
                .is_some_and(|b| !b.is_ascii_whitespace() && b != b'\\')
        {
            cursor.advance();
            cursor.mark_end();
            return Self::finish(SyntaxKind::ParamsOpen);
        }

        None
    }

    fn serialize(&self, buf: &mut ExternalState) {
        buf.set(&[u8::from(self.in_directive), self.mode as u8]);
    }

    fn deserialize(&mut self, state: &ExternalState) {
        match state.as_bytes() {
            [in_directive, mode] => {
                self.in_directive = *in_directive != 0;
                self.mode = if *mode == Mode::Define as u8 {
                    Mode::Define
                } else {
                    Mode::Other
                };
            }
            _ => self.reset(),
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
