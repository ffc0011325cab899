// ABOUTME: Syntax highlighter for the REPL with ANSI color support
//
// Re-lexes each edited line with the real `Lexer` rather than re-deriving
// token boundaries by hand, so highlighting never drifts from what the
// parser actually accepts.

use crate::lexer::{Lexer, TokenKind};
use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Helper;
use std::borrow::Cow;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_KEYWORD: &str = "\x1b[1;35m"; // bold magenta
const COLOR_NUMBER: &str = "\x1b[33m"; // yellow
const COLOR_STRING: &str = "\x1b[32m"; // green
const COLOR_BOOLEAN: &str = "\x1b[33m"; // yellow
const COLOR_IVAR: &str = "\x1b[36m"; // cyan
const COLOR_PAREN: &str = "\x1b[1;34m"; // bold blue
const COLOR_COMMENT: &str = "\x1b[90m"; // bright black

pub struct VibeHelper;

impl VibeHelper {
    pub fn new() -> Self {
        VibeHelper
    }
}

impl Default for VibeHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for VibeHelper {}

impl Completer for VibeHelper {
    type Candidate = String;
}

impl Hinter for VibeHelper {
    type Hint = String;
}

impl Validator for VibeHelper {}

impl Highlighter for VibeHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let highlighted = highlight_line(line);
        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn color_for(kind: &TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::If
        | TokenKind::Elsif
        | TokenKind::Else
        | TokenKind::End
        | TokenKind::While
        | TokenKind::For
        | TokenKind::In
        | TokenKind::Do
        | TokenKind::Def
        | TokenKind::Return
        | TokenKind::Class
        | TokenKind::SelfKw
        | TokenKind::Super
        | TokenKind::Require
        | TokenKind::Puts => Some(COLOR_KEYWORD),
        TokenKind::True | TokenKind::False | TokenKind::Nil => Some(COLOR_BOOLEAN),
        TokenKind::Integer(_) | TokenKind::Float(_) => Some(COLOR_NUMBER),
        TokenKind::Str(_) => Some(COLOR_STRING),
        TokenKind::InstanceVar(_) => Some(COLOR_IVAR),
        TokenKind::LParen | TokenKind::RParen | TokenKind::LBracket | TokenKind::RBracket => {
            Some(COLOR_PAREN)
        }
        _ => None,
    }
}

/// Splits off a trailing `# ...` comment (outside of string literals) so it
/// can be colored separately from the lexer's token stream, which never
/// sees comment text at all.
fn split_comment(line: &str) -> (&str, &str) {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '#' => return (&line[..idx], &line[idx..]),
            _ => {}
        }
    }
    (line, "")
}

fn highlight_line(line: &str) -> String {
    let (code, comment) = split_comment(line);
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::new();
    let mut cursor = 0usize;

    let mut lexer = Lexer::new(code);
    loop {
        let tok = lexer.next();
        if matches!(tok.kind, TokenKind::Eof) {
            break;
        }
        let start = tok.column.saturating_sub(1);
        if start > chars.len() {
            break;
        }
        if start > cursor {
            out.extend(&chars[cursor..start]);
        }
        let len = tok.lexeme.chars().count();
        let end = (start + len).min(chars.len());
        let text: String = chars[start..end].iter().collect();
        match color_for(&tok.kind) {
            Some(color) => {
                out.push_str(color);
                out.push_str(&text);
                out.push_str(COLOR_RESET);
            }
            None => out.push_str(&text),
        }
        cursor = end;
    }
    if cursor < chars.len() {
        out.extend(&chars[cursor..]);
    }

    if !comment.is_empty() {
        out.push_str(COLOR_COMMENT);
        out.push_str(comment);
        out.push_str(COLOR_RESET);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_numbers() {
        assert!(highlight_line("42").contains(COLOR_NUMBER));
    }

    #[test]
    fn colors_strings() {
        assert!(highlight_line("\"hello\"").contains(COLOR_STRING));
    }

    #[test]
    fn colors_keywords() {
        let out = highlight_line("if true do");
        assert!(out.contains(COLOR_KEYWORD));
        assert!(out.contains(COLOR_BOOLEAN));
    }

    #[test]
    fn colors_comments_without_touching_strings() {
        let out = highlight_line("puts \"a # b\" # real comment");
        assert!(out.contains(COLOR_COMMENT));
        assert!(out.contains("a # b"));
    }

    #[test]
    fn colors_instance_vars() {
        assert!(highlight_line("@count = 1").contains(COLOR_IVAR));
    }

    #[test]
    fn leaves_plain_identifiers_uncolored_but_intact() {
        let out = highlight_line("foo = 1");
        assert!(out.contains("foo"));
    }
}
