// ABOUTME: AST node definitions for parsed Vibe programs
//
// Pure data: a closed set of tagged node variants plus positional
// accessors and a structural `Display` used for diagnostics and REPL
// echo. No evaluation behavior lives here (spec.md §4.2).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A declared type annotation: a name plus optional generic arguments,
/// e.g. `Array<Int>` or bare `Int`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub name: String,
    pub generics: Vec<TypeAnnotation>,
    pub pos: Position,
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.generics.is_empty() {
            write!(f, "<")?;
            for (i, g) in self.generics.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", g)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_annotation: Option<TypeAnnotation>,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(t) = &self.type_annotation {
            write!(f, ": {}", t)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Range,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Range => "..",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnOp {
    Neg,
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
        };
        write!(f, "{}", s)
    }
}

/// A numeric literal's value, kept as the lexer produced it — `i64` for an
/// integer literal, `f64` for a dotted one — so large integers survive the
/// lex→AST→eval round trip exactly (spec.md §3.3: `Integer(i64)` never
/// silently loses precision).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
    Integer(i64),
    Float(f64),
}

/// Expression node. Every variant carries its source `Position`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number { value: NumberLiteral, pos: Position },
    Str { value: String, pos: Position },
    Bool { value: bool, pos: Position },
    Nil { pos: Position },
    Identifier { name: String, pos: Position },
    SelfExpr { pos: Position },
    InstanceVar { name: String, pos: Position },
    ArrayLit { elements: Vec<Expr>, pos: Position },
    Binary { left: Box<Expr>, op: BinOp, right: Box<Expr>, pos: Position },
    Unary { op: UnOp, operand: Box<Expr>, pos: Position },
    Call { callee: Box<Expr>, args: Vec<Expr>, pos: Position },
    Index { target: Box<Expr>, index: Box<Expr>, pos: Position },
    Dot { target: Box<Expr>, field: String, pos: Position },
    MethodCall { receiver: Box<Expr>, method: String, args: Vec<Expr>, pos: Position },
    SuperCall { method: String, args: Vec<Expr>, pos: Position },
    ClassInstantiation { class_name: String, args: Vec<Expr>, pos: Position },
}

impl Expr {
    pub fn pos(&self) -> Position {
        match self {
            Expr::Number { pos, .. }
            | Expr::Str { pos, .. }
            | Expr::Bool { pos, .. }
            | Expr::Nil { pos, .. }
            | Expr::Identifier { pos, .. }
            | Expr::SelfExpr { pos, .. }
            | Expr::InstanceVar { pos, .. }
            | Expr::ArrayLit { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Call { pos, .. }
            | Expr::Index { pos, .. }
            | Expr::Dot { pos, .. }
            | Expr::MethodCall { pos, .. }
            | Expr::SuperCall { pos, .. }
            | Expr::ClassInstantiation { pos, .. } => *pos,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number { value, .. } => match value {
                NumberLiteral::Integer(n) => write!(f, "{}", n),
                NumberLiteral::Float(n) => write!(f, "{}", n),
            },
            Expr::Str { value, .. } => write!(f, "\"{}\"", value),
            Expr::Bool { value, .. } => write!(f, "{}", value),
            Expr::Nil { .. } => write!(f, "nil"),
            Expr::Identifier { name, .. } => write!(f, "{}", name),
            Expr::SelfExpr { .. } => write!(f, "self"),
            Expr::InstanceVar { name, .. } => write!(f, "@{}", name),
            Expr::ArrayLit { elements, .. } => {
                write!(f, "[")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, "]")
            }
            Expr::Binary { left, op, right, .. } => write!(f, "({} {} {})", left, op, right),
            Expr::Unary { op, operand, .. } => write!(f, "({}{})", op, operand),
            Expr::Call { callee, args, .. } => {
                write!(f, "{}(", callee)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            Expr::Index { target, index, .. } => write!(f, "{}[{}]", target, index),
            Expr::Dot { target, field, .. } => write!(f, "{}.{}", target, field),
            Expr::MethodCall { receiver, method, args, .. } => {
                write!(f, "{}.{}(", receiver, method)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            Expr::SuperCall { method, args, .. } => {
                write!(f, "super.{}(", method)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            Expr::ClassInstantiation { class_name, args, .. } => {
                write!(f, "{}.new(", class_name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Identifier(String),
    Index(Box<Expr>, Box<Expr>),
    Dot(Box<Expr>, String),
    InstanceVar(String),
}

impl fmt::Display for AssignTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignTarget::Identifier(name) => write!(f, "{}", name),
            AssignTarget::Index(target, index) => write!(f, "{}[{}]", target, index),
            AssignTarget::Dot(target, field) => write!(f, "{}.{}", target, field),
            AssignTarget::InstanceVar(name) => write!(f, "@{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub parent: Option<String>,
    pub methods: Vec<FunctionDef>,
    pub ivars: Vec<String>,
    pub pos: Position,
}

/// Statement and declaration node. Every variant carries its source `Position`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Block(Block),
    Return { value: Option<Expr>, pos: Position },
    If {
        branches: Vec<(Expr, Block)>,
        else_branch: Option<Block>,
        pos: Position,
    },
    While { condition: Expr, body: Block, pos: Position },
    For { var: String, iterable: Expr, body: Block, pos: Position },
    Print { value: Expr, pos: Position },
    Require { path: String, pos: Position },
    Assignment { target: AssignTarget, value: Expr, pos: Position },
    VarDecl {
        name: String,
        type_annotation: Option<TypeAnnotation>,
        value: Expr,
        pos: Position,
    },
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
}

impl Stmt {
    pub fn pos(&self) -> Position {
        match self {
            Stmt::Expr(e) => e.pos(),
            Stmt::Block(b) => b.statements.first().map(|s| s.pos()).unwrap_or_default(),
            Stmt::Return { pos, .. }
            | Stmt::If { pos, .. }
            | Stmt::While { pos, .. }
            | Stmt::For { pos, .. }
            | Stmt::Print { pos, .. }
            | Stmt::Require { pos, .. }
            | Stmt::Assignment { pos, .. }
            | Stmt::VarDecl { pos, .. } => *pos,
            Stmt::FunctionDef(f) => f.pos,
            Stmt::ClassDef(c) => c.pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}
