// ABOUTME: Pratt parser turning a token stream into a Program plus accumulated errors

use crate::ast::*;
use crate::error::VibeError;
use crate::lexer::{Lexer, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Prec {
    Lowest,
    Logical,
    Equals,
    Compare,
    Sum,
    Product,
    Power,
    Prefix,
    Call,
    Index,
    Dot,
}

impl Prec {
    fn of(kind: &TokenKind) -> Prec {
        match kind {
            TokenKind::AndAnd | TokenKind::OrOr => Prec::Logical,
            TokenKind::Eq | TokenKind::NotEq => Prec::Equals,
            TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => Prec::Compare,
            TokenKind::Plus | TokenKind::Minus | TokenKind::DotDot => Prec::Sum,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Prec::Product,
            TokenKind::StarStar => Prec::Power,
            TokenKind::LParen => Prec::Call,
            TokenKind::LBracket => Prec::Index,
            TokenKind::Dot => Prec::Dot,
            _ => Prec::Lowest,
        }
    }

    fn one_below(self) -> Prec {
        match self {
            Prec::Lowest => Prec::Lowest,
            Prec::Logical => Prec::Lowest,
            Prec::Equals => Prec::Logical,
            Prec::Compare => Prec::Equals,
            Prec::Sum => Prec::Compare,
            Prec::Product => Prec::Sum,
            Prec::Power => Prec::Product,
            Prec::Prefix => Prec::Power,
            Prec::Call => Prec::Prefix,
            Prec::Index => Prec::Call,
            Prec::Dot => Prec::Index,
        }
    }
}

/// Parses `source` into a `Program` plus every diagnostic collected along
/// the way. A non-empty error list means the caller should not evaluate
/// (spec.md §4.3/§8).
pub fn parse(source: &str) -> (Program, Vec<VibeError>) {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        let tok = lexer.next();
        match &tok.kind {
            TokenKind::LexError(msg) => {
                errors.push(VibeError::LexError {
                    message: format!("unexpected character '{}'", msg),
                    line: tok.line,
                    column: tok.column,
                });
            }
            TokenKind::Eof => {
                tokens.push(tok);
                break;
            }
            _ => tokens.push(tok),
        }
    }

    let mut parser = Parser { tokens, pos: 0, errors };
    let program = parser.parse_program();
    (program, parser.errors)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<VibeError>,
}

const BLOCK_ENDERS: &[TokenKind] = &[TokenKind::End, TokenKind::Elsif, TokenKind::Else];

impl Parser {
    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn pos_here(&self) -> Position {
        Position::new(self.current().line, self.current().column)
    }

    fn is_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !matches!(tok.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.kind()) == std::mem::discriminant(kind)
    }

    fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|k| self.check(k))
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let pos = self.pos_here();
        self.errors.push(VibeError::ParseError {
            message: message.into(),
            line: pos.line,
            column: pos.column,
        });
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error_here(format!("expected {}, found '{}'", what, self.current().lexeme));
            None
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn resync(&mut self) {
        loop {
            if self.is_eof() || self.check_any(BLOCK_ENDERS) {
                return;
            }
            if self.check(&TokenKind::Newline) {
                self.advance();
                return;
            }
            self.advance();
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_program(&mut self) -> Program {
        let block = self.parse_block(&[]);
        Program {
            statements: block.statements,
        }
    }

    fn parse_block(&mut self, terminators: &[TokenKind]) -> Block {
        let mut statements = Vec::new();
        self.skip_newlines();
        while !self.is_eof() && !self.check_any(terminators) {
            let before = self.pos;
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            if self.check(&TokenKind::Newline) {
                self.advance();
                self.skip_newlines();
            } else if self.is_eof() || self.check_any(terminators) {
                break;
            } else {
                self.error_here("expected newline after statement");
                self.resync();
            }
            if self.pos == before {
                // Guard against a statement parser that consumed nothing.
                self.advance();
            }
        }
        Block { statements }
    }

    fn expect_block_open(&mut self) {
        if self.check(&TokenKind::Do) {
            self.advance();
        } else if self.check(&TokenKind::Newline) {
            // the newline itself opens the block
        } else {
            self.error_here("expected 'do' or newline to begin block");
        }
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.kind().clone() {
            TokenKind::If => Some(self.parse_if()),
            TokenKind::While => Some(self.parse_while()),
            TokenKind::For => Some(self.parse_for()),
            TokenKind::Def => Some(self.parse_def()),
            TokenKind::Class => Some(self.parse_class()),
            TokenKind::Return => Some(self.parse_return()),
            TokenKind::Require => Some(self.parse_require()),
            TokenKind::Puts => Some(self.parse_puts()),
            TokenKind::Newline | TokenKind::Eof => None,
            TokenKind::Identifier(_) if self.peek_is_colon() => Some(self.parse_var_decl()),
            _ => Some(self.parse_assignment_or_expr()),
        }
    }

    fn peek_is_colon(&self) -> bool {
        self.tokens
            .get(self.pos + 1)
            .map(|t| matches!(t.kind, TokenKind::Colon))
            .unwrap_or(false)
    }

    fn parse_var_decl(&mut self) -> Stmt {
        let pos = self.pos_here();
        let name = match self.advance().kind {
            TokenKind::Identifier(name) => name,
            _ => unreachable!("guarded by caller"),
        };
        self.expect(&TokenKind::Colon, "':'");
        let type_annotation = self.parse_type();
        self.expect(&TokenKind::Assign, "'='");
        let value = self.parse_expression(Prec::Lowest);
        Stmt::VarDecl {
            name,
            type_annotation,
            value,
            pos,
        }
    }

    fn parse_assignment_or_expr(&mut self) -> Stmt {
        let pos = self.pos_here();
        let expr = self.parse_expression(Prec::Lowest);
        if self.check(&TokenKind::Assign) {
            self.advance();
            match expr_to_assign_target(&expr) {
                Some(target) => {
                    let value = self.parse_expression(Prec::Lowest);
                    Stmt::Assignment { target, value, pos }
                }
                None => {
                    self.error_here("invalid assignment target");
                    let _ = self.parse_expression(Prec::Lowest);
                    Stmt::Expr(expr)
                }
            }
        } else {
            Stmt::Expr(expr)
        }
    }

    fn parse_if(&mut self) -> Stmt {
        let pos = self.pos_here();
        self.advance(); // 'if'
        let mut branches = Vec::new();
        let cond = self.parse_expression(Prec::Lowest);
        self.expect_block_open();
        let body = self.parse_block(&[TokenKind::Elsif, TokenKind::Else, TokenKind::End]);
        branches.push((cond, body));

        while self.check(&TokenKind::Elsif) {
            self.advance();
            let cond = self.parse_expression(Prec::Lowest);
            self.expect_block_open();
            let body = self.parse_block(&[TokenKind::Elsif, TokenKind::Else, TokenKind::End]);
            branches.push((cond, body));
        }

        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            self.skip_newlines();
            Some(self.parse_block(&[TokenKind::End]))
        } else {
            None
        };

        self.expect(&TokenKind::End, "'end'");
        Stmt::If {
            branches,
            else_branch,
            pos,
        }
    }

    fn parse_while(&mut self) -> Stmt {
        let pos = self.pos_here();
        self.advance(); // 'while'
        let condition = self.parse_expression(Prec::Lowest);
        self.expect_block_open();
        let body = self.parse_block(&[TokenKind::End]);
        self.expect(&TokenKind::End, "'end'");
        Stmt::While {
            condition,
            body,
            pos,
        }
    }

    fn parse_for(&mut self) -> Stmt {
        let pos = self.pos_here();
        self.advance(); // 'for'
        let var = match self.expect(&TokenKind::Identifier(String::new()), "loop variable") {
            Some(tok) => match tok.kind {
                TokenKind::Identifier(name) => name,
                _ => String::new(),
            },
            None => String::new(),
        };
        self.expect(&TokenKind::In, "'in'");
        let iterable = self.parse_expression(Prec::Lowest);
        self.expect_block_open();
        let body = self.parse_block(&[TokenKind::End]);
        self.expect(&TokenKind::End, "'end'");
        Stmt::For {
            var,
            iterable,
            body,
            pos,
        }
    }

    fn parse_def(&mut self) -> Stmt {
        Stmt::FunctionDef(self.parse_function_def())
    }

    fn parse_function_def(&mut self) -> FunctionDef {
        let pos = self.pos_here();
        self.advance(); // 'def'
        let name = match self.expect(&TokenKind::Identifier(String::new()), "function name") {
            Some(tok) => match tok.kind {
                TokenKind::Identifier(name) => name,
                _ => String::new(),
            },
            None => String::new(),
        };
        self.expect(&TokenKind::LParen, "'('");
        let params = self.parse_params();
        self.expect(&TokenKind::RParen, "')'");

        let return_type = if self.check(&TokenKind::Colon) {
            self.advance();
            self.parse_type()
        } else {
            None
        };

        self.expect_block_open();
        let body = self.parse_block(&[TokenKind::End]);
        self.expect(&TokenKind::End, "'end'");

        FunctionDef {
            name,
            params,
            return_type,
            body,
            pos,
        }
    }

    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        self.skip_newlines();
        if self.check(&TokenKind::RParen) {
            return params;
        }
        loop {
            self.skip_newlines();
            let name = match self.expect(&TokenKind::Identifier(String::new()), "parameter name") {
                Some(tok) => match tok.kind {
                    TokenKind::Identifier(name) => name,
                    _ => String::new(),
                },
                None => break,
            };
            let type_annotation = if self.check(&TokenKind::Colon) {
                self.advance();
                self.parse_type()
            } else {
                None
            };
            params.push(Param {
                name,
                type_annotation,
            });
            self.skip_newlines();
            if self.check(&TokenKind::Comma) {
                self.advance();
                self.skip_newlines();
                continue;
            }
            break;
        }
        params
    }

    fn parse_type(&mut self) -> Option<TypeAnnotation> {
        let pos = self.pos_here();
        let name = match self.expect(&TokenKind::Identifier(String::new()), "type name") {
            Some(tok) => match tok.kind {
                TokenKind::Identifier(name) => name,
                _ => return None,
            },
            None => return None,
        };
        let mut generics = Vec::new();
        if self.check(&TokenKind::Lt) {
            self.advance();
            loop {
                if let Some(g) = self.parse_type() {
                    generics.push(g);
                }
                if self.check(&TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
            self.expect(&TokenKind::Gt, "'>'");
        }
        Some(TypeAnnotation { name, generics, pos })
    }

    fn parse_class(&mut self) -> Stmt {
        let pos = self.pos_here();
        self.advance(); // 'class'
        let name = match self.expect(&TokenKind::Identifier(String::new()), "class name") {
            Some(tok) => match tok.kind {
                TokenKind::Identifier(name) => name,
                _ => String::new(),
            },
            None => String::new(),
        };
        let parent = if self.check(&TokenKind::Lt) {
            self.advance();
            match self.expect(&TokenKind::Identifier(String::new()), "parent class name") {
                Some(tok) => match tok.kind {
                    TokenKind::Identifier(name) => Some(name),
                    _ => None,
                },
                None => None,
            }
        } else {
            None
        };

        if self.check(&TokenKind::Newline) {
            self.advance();
        } else {
            self.error_here("expected newline after class header");
        }
        self.skip_newlines();

        let mut methods = Vec::new();
        let mut ivars = Vec::new();
        while !self.is_eof() && !self.check(&TokenKind::End) {
            match self.kind().clone() {
                TokenKind::InstanceVar(name) => {
                    self.advance();
                    ivars.push(name);
                    if self.check(&TokenKind::Newline) {
                        self.advance();
                        self.skip_newlines();
                    } else if !self.is_eof() && !self.check(&TokenKind::End) {
                        self.error_here("expected newline after instance variable declaration");
                        self.resync();
                    }
                }
                TokenKind::Def => {
                    methods.push(self.parse_function_def());
                    self.skip_newlines();
                }
                _ => {
                    self.error_here("expected instance variable or method definition");
                    self.resync();
                }
            }
        }
        self.expect(&TokenKind::End, "'end'");

        Stmt::ClassDef(ClassDef {
            name,
            parent,
            methods,
            ivars,
            pos,
        })
    }

    fn parse_return(&mut self) -> Stmt {
        let pos = self.pos_here();
        self.advance(); // 'return'
        let value = if self.check(&TokenKind::Newline) || self.is_eof() || self.check_any(BLOCK_ENDERS) {
            None
        } else {
            Some(self.parse_expression(Prec::Lowest))
        };
        Stmt::Return { value, pos }
    }

    fn parse_require(&mut self) -> Stmt {
        let pos = self.pos_here();
        self.advance(); // 'require'
        let expr = self.parse_expression(Prec::Lowest);
        let path = match expr {
            Expr::Str { value, .. } => value,
            _ => {
                self.error_here("require expects a string literal path");
                String::new()
            }
        };
        Stmt::Require { path, pos }
    }

    fn parse_puts(&mut self) -> Stmt {
        let pos = self.pos_here();
        self.advance(); // 'puts'
        let value = self.parse_expression(Prec::Lowest);
        Stmt::Print { value, pos }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression(&mut self, min_prec: Prec) -> Expr {
        let mut left = self.parse_prefix();
        while min_prec < Prec::of(self.kind()) {
            left = self.parse_infix(left);
        }
        left
    }

    fn parse_prefix(&mut self) -> Expr {
        let pos = self.pos_here();
        match self.kind().clone() {
            TokenKind::Integer(n) => {
                self.advance();
                Expr::Number {
                    value: NumberLiteral::Integer(n),
                    pos,
                }
            }
            TokenKind::Float(n) => {
                self.advance();
                Expr::Number {
                    value: NumberLiteral::Float(n),
                    pos,
                }
            }
            TokenKind::Str(s) => {
                self.advance();
                Expr::Str { value: s, pos }
            }
            TokenKind::True => {
                self.advance();
                Expr::Bool { value: true, pos }
            }
            TokenKind::False => {
                self.advance();
                Expr::Bool { value: false, pos }
            }
            TokenKind::Nil => {
                self.advance();
                Expr::Nil { pos }
            }
            TokenKind::SelfKw => {
                self.advance();
                Expr::SelfExpr { pos }
            }
            TokenKind::InstanceVar(name) => {
                self.advance();
                Expr::InstanceVar { name, pos }
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Expr::Identifier { name, pos }
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expression(Prec::Prefix);
                Expr::Unary {
                    op: UnOp::Neg,
                    operand: Box::new(operand),
                    pos,
                }
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_expression(Prec::Prefix);
                Expr::Unary {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                    pos,
                }
            }
            TokenKind::LParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.parse_expression(Prec::Lowest);
                self.skip_newlines();
                self.expect(&TokenKind::RParen, "')'");
                inner
            }
            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_expr_list(&TokenKind::RBracket);
                self.expect(&TokenKind::RBracket, "']'");
                Expr::ArrayLit { elements, pos }
            }
            TokenKind::Super => {
                self.advance();
                self.expect(&TokenKind::Dot, "'.' after 'super'");
                let method = match self.expect(&TokenKind::Identifier(String::new()), "method name") {
                    Some(tok) => match tok.kind {
                        TokenKind::Identifier(name) => name,
                        _ => String::new(),
                    },
                    None => String::new(),
                };
                self.expect(&TokenKind::LParen, "'('");
                let args = self.parse_expr_list(&TokenKind::RParen);
                self.expect(&TokenKind::RParen, "')'");
                Expr::SuperCall { method, args, pos }
            }
            _ => {
                self.error_here(format!("unexpected token '{}'", self.current().lexeme));
                self.advance();
                Expr::Nil { pos }
            }
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Expr {
        let pos = left.pos();
        match self.kind().clone() {
            TokenKind::LParen => {
                self.advance();
                let args = self.parse_expr_list(&TokenKind::RParen);
                self.expect(&TokenKind::RParen, "')'");
                Expr::Call {
                    callee: Box::new(left),
                    args,
                    pos,
                }
            }
            TokenKind::LBracket => {
                self.advance();
                self.skip_newlines();
                let index = self.parse_expression(Prec::Lowest);
                self.skip_newlines();
                self.expect(&TokenKind::RBracket, "']'");
                Expr::Index {
                    target: Box::new(left),
                    index: Box::new(index),
                    pos,
                }
            }
            TokenKind::Dot => {
                self.advance();
                let field = match self.expect(&TokenKind::Identifier(String::new()), "field or method name") {
                    Some(tok) => match tok.kind {
                        TokenKind::Identifier(name) => name,
                        _ => String::new(),
                    },
                    None => String::new(),
                };
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_expr_list(&TokenKind::RParen);
                    self.expect(&TokenKind::RParen, "')'");
                    if field == "new" {
                        if let Expr::Identifier { name, .. } = &left {
                            return Expr::ClassInstantiation {
                                class_name: name.clone(),
                                args,
                                pos,
                            };
                        }
                    }
                    Expr::MethodCall {
                        receiver: Box::new(left),
                        method: field,
                        args,
                        pos,
                    }
                } else {
                    Expr::Dot {
                        target: Box::new(left),
                        field,
                        pos,
                    }
                }
            }
            TokenKind::StarStar => {
                self.advance();
                let right = self.parse_expression(Prec::Power.one_below());
                Expr::Binary {
                    left: Box::new(left),
                    op: BinOp::Pow,
                    right: Box::new(right),
                    pos,
                }
            }
            other => {
                let op = match other {
                    TokenKind::Plus => BinOp::Add,
                    TokenKind::Minus => BinOp::Sub,
                    TokenKind::Star => BinOp::Mul,
                    TokenKind::Slash => BinOp::Div,
                    TokenKind::Percent => BinOp::Mod,
                    TokenKind::Eq => BinOp::Eq,
                    TokenKind::NotEq => BinOp::NotEq,
                    TokenKind::Lt => BinOp::Lt,
                    TokenKind::LtEq => BinOp::LtEq,
                    TokenKind::Gt => BinOp::Gt,
                    TokenKind::GtEq => BinOp::GtEq,
                    TokenKind::AndAnd => BinOp::And,
                    TokenKind::OrOr => BinOp::Or,
                    TokenKind::DotDot => BinOp::Range,
                    _ => unreachable!("Prec::of only admits handled operators"),
                };
                let prec = Prec::of(&other);
                self.advance();
                self.skip_newlines();
                let right = self.parse_expression(prec);
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                    pos,
                }
            }
        }
    }

    fn parse_expr_list(&mut self, closing: &TokenKind) -> Vec<Expr> {
        let mut items = Vec::new();
        self.skip_newlines();
        if self.check(closing) {
            return items;
        }
        loop {
            self.skip_newlines();
            items.push(self.parse_expression(Prec::Lowest));
            self.skip_newlines();
            if self.check(&TokenKind::Comma) {
                self.advance();
                self.skip_newlines();
                continue;
            }
            break;
        }
        self.skip_newlines();
        items
    }
}

fn expr_to_assign_target(expr: &Expr) -> Option<AssignTarget> {
    match expr {
        Expr::Identifier { name, .. } => Some(AssignTarget::Identifier(name.clone())),
        Expr::InstanceVar { name, .. } => Some(AssignTarget::InstanceVar(name.clone())),
        Expr::Dot { target, field, .. } => Some(AssignTarget::Dot(target.clone(), field.clone())),
        Expr::Index { target, index, .. } => {
            Some(AssignTarget::Index(target.clone(), index.clone()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(source: &str) -> Program {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        program
    }

    #[test]
    fn parses_var_decl_with_annotation() {
        let program = ok("x: Int = 5");
        assert_eq!(program.statements.len(), 1);
        assert!(matches!(program.statements[0], Stmt::VarDecl { .. }));
    }

    #[test]
    fn parses_plain_assignment() {
        let program = ok("x = 5");
        match &program.statements[0] {
            Stmt::Assignment { target, .. } => {
                assert_eq!(*target, AssignTarget::Identifier("x".to_string()))
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn parses_index_assignment() {
        let program = ok("a[0] = 1");
        assert!(matches!(
            &program.statements[0],
            Stmt::Assignment {
                target: AssignTarget::Index(_, _),
                ..
            }
        ));
    }

    #[test]
    fn precedence_groups_product_over_sum() {
        let program = ok("1 + 2 * 3");
        match &program.statements[0] {
            Stmt::Expr(Expr::Binary { op: BinOp::Add, right, .. }) => {
                assert!(matches!(**right, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let program = ok("2 ** 3 ** 2");
        match &program.statements[0] {
            Stmt::Expr(Expr::Binary {
                op: BinOp::Pow,
                left,
                right,
                ..
            }) => {
                assert!(matches!(**left, Expr::Number { .. }));
                assert!(matches!(**right, Expr::Binary { op: BinOp::Pow, .. }));
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn range_is_sum_level() {
        let program = ok("1 + 1..5");
        match &program.statements[0] {
            Stmt::Expr(Expr::Binary { op: BinOp::Range, left, .. }) => {
                assert!(matches!(**left, Expr::Binary { op: BinOp::Add, .. }));
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn parses_if_without_do_before_newline() {
        let program = ok("if true\n  1\nend");
        assert!(matches!(&program.statements[0], Stmt::If { .. }));
    }

    #[test]
    fn parses_class_with_ivars_and_methods() {
        let program = ok("class Dog\n  @name\n  def bark()\n    puts \"woof\"\n  end\nend");
        match &program.statements[0] {
            Stmt::ClassDef(class) => {
                assert_eq!(class.ivars, vec!["name".to_string()]);
                assert_eq!(class.methods.len(), 1);
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn class_instantiation_is_distinguished_from_method_call() {
        let program = ok("Dog.new(1)\nd.bark()");
        assert!(matches!(
            program.statements[0],
            Stmt::Expr(Expr::ClassInstantiation { .. })
        ));
        assert!(matches!(
            program.statements[1],
            Stmt::Expr(Expr::MethodCall { .. })
        ));
    }

    #[test]
    fn invalid_syntax_is_recovered_and_accumulated() {
        let (_program, errors) = parse("x = \nif\nend");
        assert!(!errors.is_empty());
    }

    #[test]
    fn newline_inside_parens_is_skipped() {
        let program = ok("foo(\n  1,\n  2\n)");
        assert!(matches!(
            &program.statements[0],
            Stmt::Expr(Expr::Call { args, .. }) if args.len() == 2
        ));
    }
}
