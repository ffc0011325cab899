// ABOUTME: Lexer module converting source text into a token stream with positions
//
// `Lexer::next` is idempotent once `Eof` is reached (spec.md §4.1). Token
// shapes (numbers, strings, identifiers) are recognized with small `nom`
// combinators against the remaining source slice, the same technique the
// teacher interpreter's parser uses for its own literals — the cursor here
// just tracks line/column across calls instead of folding the whole source
// into one combinator parse.

use nom::{
    bytes::complete::take_while1,
    character::complete::digit1,
    IResult,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Integer(i64),
    Float(f64),
    Str(String),
    Identifier(String),
    InstanceVar(String),

    If,
    Elsif,
    Else,
    End,
    While,
    For,
    In,
    Do,
    Def,
    Return,
    Class,
    SelfKw,
    Super,
    Require,
    True,
    False,
    Nil,
    Puts,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    Assign,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    DotDot,
    Colon,
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    At,

    Newline,
    Eof,
    LexError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

fn keyword(word: &str) -> Option<TokenKind> {
    Some(match word {
        "if" => TokenKind::If,
        "elsif" => TokenKind::Elsif,
        "else" => TokenKind::Else,
        "end" => TokenKind::End,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "do" => TokenKind::Do,
        "def" => TokenKind::Def,
        "return" => TokenKind::Return,
        "class" => TokenKind::Class,
        "self" => TokenKind::SelfKw,
        "super" => TokenKind::Super,
        "require" => TokenKind::Require,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "nil" => TokenKind::Nil,
        "puts" => TokenKind::Puts,
        _ => return None,
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ident_body(input: &str) -> IResult<&str, &str> {
    take_while1(is_ident_continue)(input)
}

pub struct Lexer {
    source: String,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.to_string(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn remaining(&self) -> &str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Advance the cursor past `consumed`, updating line/column bookkeeping.
    fn advance(&mut self, consumed: &str) {
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += consumed.len();
    }

    fn skip_inline_whitespace(&mut self) {
        let rest = self.remaining();
        let skipped: String = rest
            .chars()
            .take_while(|c| *c != '\n' && c.is_whitespace())
            .collect();
        if !skipped.is_empty() {
            self.advance(&skipped);
        }
    }

    fn skip_to_eol(&mut self) {
        let rest = self.remaining();
        let skipped: String = rest.chars().take_while(|c| *c != '\n').collect();
        self.advance(&skipped);
    }

    /// Main entry point: produce the next token. Returns `Eof` forever once
    /// the source is exhausted.
    pub fn next(&mut self) -> Token {
        loop {
            self.skip_inline_whitespace();
            if self.remaining().starts_with('#') {
                self.skip_to_eol();
                continue;
            }
            break;
        }

        let start_line = self.line;
        let start_column = self.column;

        let Some(c) = self.peek_char() else {
            return Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line: start_line,
                column: start_column,
            };
        };

        if c == '\n' {
            return self.lex_newline(start_line, start_column);
        }
        if c.is_ascii_digit() {
            return self.lex_number(start_line, start_column);
        }
        if c == '"' {
            return self.lex_string(start_line, start_column);
        }
        if c == '@' {
            return self.lex_instance_var(start_line, start_column);
        }
        if is_ident_start(c) {
            return self.lex_identifier(start_line, start_column);
        }
        self.lex_operator(start_line, start_column)
    }

    /// Runs of consecutive newlines (possibly interleaved with whitespace
    /// and comments) collapse into a single `Newline` token.
    fn lex_newline(&mut self, line: usize, column: usize) -> Token {
        loop {
            self.skip_inline_whitespace();
            if self.remaining().starts_with('#') {
                self.skip_to_eol();
                continue;
            }
            if self.remaining().starts_with('\n') {
                self.advance("\n");
                continue;
            }
            break;
        }
        Token {
            kind: TokenKind::Newline,
            lexeme: "\n".to_string(),
            line,
            column,
        }
    }

    fn lex_number(&mut self, line: usize, column: usize) -> Token {
        let rest = self.remaining();
        let (after_int, int_part) = digit1::<_, nom::error::Error<&str>>(rest)
            .expect("lex_number called without a leading digit");

        let mut chars = after_int.chars();
        let is_float = match (chars.next(), chars.next()) {
            (Some('.'), Some(next)) if next.is_ascii_digit() => true,
            // `1..5`: the second `.` means this is the range operator, not a
            // fractional part — longest-match still prefers `..` here.
            _ => false,
        };

        if is_float {
            let after_dot = &after_int[1..];
            let (rest_after, frac_part) = digit1::<_, nom::error::Error<&str>>(after_dot)
                .expect("fractional digits already verified present");
            let lexeme = &rest[..rest.len() - rest_after.len()];
            let value: f64 = lexeme.parse().expect("validated numeric lexeme");
            self.advance(lexeme);
            let _ = frac_part;
            Token {
                kind: TokenKind::Float(value),
                lexeme: lexeme.to_string(),
                line,
                column,
            }
        } else {
            let lexeme = int_part;
            let value: i64 = lexeme.parse().unwrap_or(i64::MAX);
            self.advance(lexeme);
            Token {
                kind: TokenKind::Integer(value),
                lexeme: lexeme.to_string(),
                line,
                column,
            }
        }
    }

    fn lex_string(&mut self, line: usize, column: usize) -> Token {
        let rest = self.remaining();
        let mut chars = rest.char_indices();
        chars.next(); // consume opening quote

        let mut value = String::new();
        let mut closed = false;
        let mut consumed_end = rest.len();

        while let Some((idx, c)) = chars.next() {
            match c {
                '"' => {
                    consumed_end = idx + 1;
                    closed = true;
                    break;
                }
                '\\' => {
                    if let Some((_, next)) = chars.next() {
                        match next {
                            'n' => value.push('\n'),
                            't' => value.push('\t'),
                            '\\' => value.push('\\'),
                            '"' => value.push('"'),
                            '\'' => value.push('\''),
                            other => value.push(other),
                        }
                    }
                }
                _ => value.push(c),
            }
        }

        let lexeme = &rest[..consumed_end];
        self.advance(lexeme);

        if !closed {
            return Token {
                kind: TokenKind::LexError("unterminated string literal".to_string()),
                lexeme: lexeme.to_string(),
                line,
                column,
            };
        }

        Token {
            kind: TokenKind::Str(value),
            lexeme: lexeme.to_string(),
            line,
            column,
        }
    }

    fn lex_instance_var(&mut self, line: usize, column: usize) -> Token {
        let rest = self.remaining();
        let after_at = &rest[1..];
        match ident_body(after_at) {
            Ok((_, name)) => {
                let lexeme = &rest[..1 + name.len()];
                self.advance(lexeme);
                Token {
                    kind: TokenKind::InstanceVar(name.to_string()),
                    lexeme: lexeme.to_string(),
                    line,
                    column,
                }
            }
            Err(_) => {
                self.advance("@");
                Token {
                    kind: TokenKind::LexError("@".to_string()),
                    lexeme: "@".to_string(),
                    line,
                    column,
                }
            }
        }
    }

    fn lex_identifier(&mut self, line: usize, column: usize) -> Token {
        let rest = self.remaining();
        let (_, word) = ident_body(rest).expect("lex_identifier called without ident start");
        self.advance(word);
        let kind = keyword(word).unwrap_or_else(|| TokenKind::Identifier(word.to_string()));
        Token {
            kind,
            lexeme: word.to_string(),
            line,
            column,
        }
    }

    fn lex_operator(&mut self, line: usize, column: usize) -> Token {
        // Longest match first: two-character operators before their prefixes.
        const TWO_CHAR: &[(&str, TokenKind)] = &[
            ("==", TokenKind::Eq),
            ("!=", TokenKind::NotEq),
            ("<=", TokenKind::LtEq),
            (">=", TokenKind::GtEq),
            ("&&", TokenKind::AndAnd),
            ("||", TokenKind::OrOr),
            ("**", TokenKind::StarStar),
            ("..", TokenKind::DotDot),
        ];

        let rest = self.remaining();
        for (text, kind) in TWO_CHAR {
            if rest.starts_with(text) {
                self.advance(text);
                return Token {
                    kind: kind.clone(),
                    lexeme: text.to_string(),
                    line,
                    column,
                };
            }
        }

        let Some(c) = self.peek_char() else {
            return Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line,
                column,
            };
        };

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '!' => TokenKind::Bang,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            other => {
                let lexeme = other.to_string();
                self.advance(&lexeme);
                return Token {
                    kind: TokenKind::LexError(lexeme.clone()),
                    lexeme,
                    line,
                    column,
                };
            }
        };

        let lexeme = c.to_string();
        self.advance(&lexeme);
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn lexes_integers_and_floats() {
        assert_eq!(kinds("42"), vec![TokenKind::Integer(42), TokenKind::Eof]);
        assert_eq!(kinds("3.14"), vec![TokenKind::Float(3.14), TokenKind::Eof]);
    }

    #[test]
    fn prefers_range_over_fraction() {
        assert_eq!(
            kinds("1..5"),
            vec![
                TokenKind::Integer(1),
                TokenKind::DotDot,
                TokenKind::Integer(5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_strings_with_escapes() {
        assert_eq!(
            kinds(r#""a\nb""#),
            vec![TokenKind::Str("a\nb".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_lex_error() {
        let kinds = kinds("\"abc");
        assert!(matches!(kinds[0], TokenKind::LexError(_)));
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            kinds("if foo"),
            vec![
                TokenKind::If,
                TokenKind::Identifier("foo".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_instance_var() {
        assert_eq!(
            kinds("@count"),
            vec![TokenKind::InstanceVar("count".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn collapses_consecutive_newlines() {
        assert_eq!(
            kinds("1\n\n\n2"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Newline,
                TokenKind::Integer(2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_comments() {
        assert_eq!(
            kinds("1 # comment\n2"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Newline,
                TokenKind::Integer(2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn longest_match_operators() {
        assert_eq!(
            kinds("<= >= == != && || **"),
            vec![
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::StarStar,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn positions_track_line_and_column() {
        let mut lexer = Lexer::new("ab\ncd");
        let t1 = lexer.next();
        assert_eq!((t1.line, t1.column), (1, 1));
        let t2 = lexer.next(); // newline
        assert_eq!(t2.kind, TokenKind::Newline);
        let t3 = lexer.next();
        assert_eq!((t3.line, t3.column), (2, 1));
    }
}
