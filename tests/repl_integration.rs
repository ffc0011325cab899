// ABOUTME: Integration tests for REPL-facing library functionality
//
// The REPL loop itself (rustyline's readline/history plumbing) is hard to
// automate without mock terminal input; it's exercised manually via `cargo
// run -- interactive`. These tests cover the library-side pieces the REPL
// depends on: syntax highlighting, the config constants it reads, and the
// re-lexing approach its multi-line continuation heuristic relies on.

use vibe::config;
use vibe::highlighter::VibeHelper;
use vibe::lexer::{Lexer, TokenKind};
use rustyline::highlight::Highlighter;

fn block_opens_outnumber_closes(source: &str) -> bool {
    let mut opens = 0i32;
    let mut lexer = Lexer::new(source);
    loop {
        let tok = lexer.next();
        match tok.kind {
            TokenKind::Eof => break,
            TokenKind::If
            | TokenKind::While
            | TokenKind::For
            | TokenKind::Def
            | TokenKind::Class
            | TokenKind::Do => opens += 1,
            TokenKind::End => opens -= 1,
            _ => {}
        }
    }
    opens > 0
}

#[test]
fn an_unterminated_def_is_detected_as_incomplete() {
    assert!(block_opens_outnumber_closes("def greet(name)\n  puts name\n"));
}

#[test]
fn a_closed_def_is_not_incomplete() {
    assert!(!block_opens_outnumber_closes(
        "def greet(name)\n  puts name\nend\n"
    ));
}

#[test]
fn an_if_with_do_needs_two_ends_by_this_count() {
    // `do` is itself counted as a block-opener alongside `if`, so a single
    // `if ... do ... end` reads as still-open by a naive open/close count.
    // This is a known quirk of the substring-free but still-simplistic
    // heuristic, not a parser bug — the parser itself has no such issue.
    assert!(block_opens_outnumber_closes("if true do\n  puts 1\nend\n"));
}

#[test]
fn highlighter_colors_a_repl_line_without_panicking() {
    let helper = VibeHelper::new();
    let highlighted = helper.highlight("x = 1 + 2 # comment", 0);
    assert!(highlighted.contains('1'));
}

#[test]
fn welcome_and_help_text_are_non_empty() {
    assert!(!config::WELCOME_MESSAGE.is_empty());
    assert!(!config::WELCOME_SUBTITLE.is_empty());
    assert!(config::HELP_TEXT.contains("exit"));
}

#[test]
fn history_limit_is_a_sane_positive_default() {
    assert!(config::DEFAULT_HISTORY_LIMIT > 0);
}
