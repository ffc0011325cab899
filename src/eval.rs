// ABOUTME: Tree-walking evaluator: statements, expressions, classes, and require

use crate::ast::*;
use crate::env::Environment;
use crate::error::VibeError;
use crate::types::Type;
use crate::value::{Class, Function, Instance, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// External collaborator for `require` (spec.md §1): given an import path,
/// returns source text or a not-found signal. The core never touches a
/// filesystem directly.
pub trait ModuleResolver {
    fn resolve(&self, path: &str) -> Result<String, String>;
}

/// The current call frame's receiver and originating class, threaded
/// through evaluation so `self`/`@ivar`/`super` resolve correctly without
/// polluting the environment with reserved names.
#[derive(Clone, Default)]
struct CallCtx {
    self_value: Option<Value>,
    defining_class: Option<Rc<Class>>,
}

fn err(e: VibeError) -> Value {
    Value::Error(Rc::new(e))
}

fn type_error_at(pos: Position, message: impl Into<String>) -> Value {
    err(VibeError::type_error(message, pos.line, pos.column))
}

pub struct Evaluator<'a> {
    resolver: &'a dyn ModuleResolver,
}

impl<'a> Evaluator<'a> {
    pub fn new(resolver: &'a dyn ModuleResolver) -> Self {
        Evaluator { resolver }
    }

    pub fn evaluate(&self, program: &Program, env: &Rc<Environment>) -> Value {
        let ctx = CallCtx::default();
        let mut result = Value::Nil;
        for stmt in &program.statements {
            result = self.eval_stmt(stmt, env, &ctx);
            if result.is_error() {
                return result;
            }
        }
        match result {
            Value::Return(inner) => *inner,
            other => other,
        }
    }

    fn eval_block(&self, block: &Block, env: &Rc<Environment>, ctx: &CallCtx) -> Value {
        let mut result = Value::Nil;
        for stmt in &block.statements {
            result = self.eval_stmt(stmt, env, ctx);
            if result.is_error() || matches!(result, Value::Return(_)) {
                return result;
            }
        }
        result
    }

    fn eval_stmt(&self, stmt: &Stmt, env: &Rc<Environment>, ctx: &CallCtx) -> Value {
        match stmt {
            Stmt::Expr(e) => self.eval_expr(e, env, ctx),
            Stmt::Block(b) => {
                let child = Environment::with_parent(env.clone());
                self.eval_block(b, &child, ctx)
            }
            Stmt::Return { value, .. } => {
                let v = match value {
                    Some(e) => self.eval_expr(e, env, ctx),
                    None => Value::Nil,
                };
                if v.is_error() {
                    v
                } else {
                    Value::Return(Box::new(v))
                }
            }
            Stmt::If {
                branches,
                else_branch,
                ..
            } => {
                for (cond, body) in branches {
                    let c = self.eval_expr(cond, env, ctx);
                    if c.is_error() {
                        return c;
                    }
                    if c.is_truthy() {
                        let child = Environment::with_parent(env.clone());
                        return self.eval_block(body, &child, ctx);
                    }
                }
                if let Some(else_branch) = else_branch {
                    let child = Environment::with_parent(env.clone());
                    return self.eval_block(else_branch, &child, ctx);
                }
                Value::Nil
            }
            Stmt::While {
                condition, body, ..
            } => {
                let mut result = Value::Nil;
                loop {
                    let c = self.eval_expr(condition, env, ctx);
                    if c.is_error() {
                        return c;
                    }
                    if !c.is_truthy() {
                        break;
                    }
                    let child = Environment::with_parent(env.clone());
                    result = self.eval_block(body, &child, ctx);
                    if result.is_error() || matches!(result, Value::Return(_)) {
                        return result;
                    }
                }
                result
            }
            Stmt::For {
                var,
                iterable,
                body,
                ..
            } => {
                let it = self.eval_expr(iterable, env, ctx);
                if it.is_error() {
                    return it;
                }
                let items: Vec<Value> = match &it {
                    Value::Array(items) => items.borrow().clone(),
                    other => {
                        let pos = iterable.pos();
                        return err(VibeError::NotIterable {
                            type_name: other.type_name(),
                            line: pos.line,
                            column: pos.column,
                        });
                    }
                };
                let mut result = Value::Nil;
                for item in items {
                    let child = Environment::with_parent(env.clone());
                    child.define(var.clone(), item);
                    result = self.eval_block(body, &child, ctx);
                    if result.is_error() || matches!(result, Value::Return(_)) {
                        return result;
                    }
                }
                result
            }
            Stmt::Print { value, .. } => {
                let v = self.eval_expr(value, env, ctx);
                if v.is_error() {
                    return v;
                }
                println!("{}", v);
                Value::Nil
            }
            Stmt::Require { path, pos } => self.eval_require(path, *pos, env),
            Stmt::Assignment { target, value, pos } => {
                self.eval_assignment(target, value, *pos, env, ctx)
            }
            Stmt::VarDecl {
                name,
                type_annotation,
                value,
                pos,
            } => self.eval_var_decl(name, type_annotation, value, *pos, env, ctx),
            Stmt::FunctionDef(f) => {
                let func = Rc::new(Function {
                    def: Rc::new(f.clone()),
                    closure: env.clone(),
                    owner: RefCell::new(None),
                });
                env.define(f.name.clone(), Value::Function(func));
                Value::Nil
            }
            Stmt::ClassDef(c) => {
                self.eval_class_def(c, env);
                Value::Nil
            }
        }
    }

    fn eval_var_decl(
        &self,
        name: &str,
        type_annotation: &Option<TypeAnnotation>,
        value: &Expr,
        pos: Position,
        env: &Rc<Environment>,
        ctx: &CallCtx,
    ) -> Value {
        let v = self.eval_expr(value, env, ctx);
        if v.is_error() {
            return v;
        }
        match type_annotation {
            Some(ann) => {
                let declared = type_from_annotation(ann);
                if !Type::of_value(&v).is_assignable_to(&declared) {
                    return type_error_at(
                        pos,
                        format!(
                            "cannot assign {} to {}",
                            Type::of_value(&v).to_string().to_lowercase(),
                            declared.to_string().to_lowercase()
                        ),
                    );
                }
                env.define_typed(name.to_string(), v.clone(), declared);
            }
            None => env.define(name.to_string(), v.clone()),
        }
        v
    }

    fn eval_assignment(
        &self,
        target: &AssignTarget,
        value: &Expr,
        pos: Position,
        env: &Rc<Environment>,
        ctx: &CallCtx,
    ) -> Value {
        let v = self.eval_expr(value, env, ctx);
        if v.is_error() {
            return v;
        }
        match target {
            AssignTarget::Identifier(name) => {
                if let Some(declared) = env.declared_type(name) {
                    if !Type::of_value(&v).is_assignable_to(&declared) {
                        return type_error_at(
                            pos,
                            format!(
                                "cannot assign {} to {}",
                                Type::of_value(&v).to_string().to_lowercase(),
                                declared.to_string().to_lowercase()
                            ),
                        );
                    }
                }
                env.assign(name, v.clone());
                v
            }
            AssignTarget::InstanceVar(name) => match &ctx.self_value {
                Some(Value::Instance(inst)) => {
                    inst.fields.borrow_mut().insert(name.clone(), v.clone());
                    v
                }
                _ => err(VibeError::attribute_error(
                    "no self in this context",
                    pos.line,
                    pos.column,
                )),
            },
            AssignTarget::Dot(target_expr, field) => {
                let target_v = self.eval_expr(target_expr, env, ctx);
                if target_v.is_error() {
                    return target_v;
                }
                match &target_v {
                    Value::Instance(inst) => {
                        inst.fields.borrow_mut().insert(field.clone(), v.clone());
                        v
                    }
                    other => type_error_at(
                        pos,
                        format!("cannot set field on value of type {}", other.type_name()),
                    ),
                }
            }
            AssignTarget::Index(target_expr, index_expr) => {
                let target_v = self.eval_expr(target_expr, env, ctx);
                if target_v.is_error() {
                    return target_v;
                }
                let idx_v = self.eval_expr(index_expr, env, ctx);
                if idx_v.is_error() {
                    return idx_v;
                }
                match (&target_v, &idx_v) {
                    (Value::Array(items), Value::Integer(idx)) => {
                        let mut items = items.borrow_mut();
                        let len = items.len() as i64;
                        if *idx == len {
                            items.push(v.clone());
                            v
                        } else if *idx >= 0 && *idx < len {
                            items[*idx as usize] = v.clone();
                            v
                        } else {
                            err(VibeError::index_error(
                                format!("index {} out of range for length {}", idx, len),
                                pos.line,
                                pos.column,
                            ))
                        }
                    }
                    (Value::Array(_), _) => type_error_at(pos, "array index must be an integer"),
                    (other, _) => type_error_at(
                        pos,
                        format!("cannot index into value of type {}", other.type_name()),
                    ),
                }
            }
        }
    }

    fn eval_expr(&self, expr: &Expr, env: &Rc<Environment>, ctx: &CallCtx) -> Value {
        match expr {
            Expr::Number { value, .. } => match value {
                NumberLiteral::Integer(n) => Value::Integer(*n),
                NumberLiteral::Float(n) => Value::Float(*n),
            },
            Expr::Str { value, .. } => Value::Str(value.clone()),
            Expr::Bool { value, .. } => Value::Boolean(*value),
            Expr::Nil { .. } => Value::Nil,
            Expr::Identifier { name, pos } => env.get(name).unwrap_or_else(|| {
                err(VibeError::name_error(name.clone(), pos.line, pos.column))
            }),
            Expr::SelfExpr { pos } => ctx.self_value.clone().unwrap_or_else(|| {
                err(VibeError::name_error("self", pos.line, pos.column))
            }),
            Expr::InstanceVar { name, pos } => match &ctx.self_value {
                Some(Value::Instance(inst)) => inst
                    .fields
                    .borrow()
                    .get(name)
                    .cloned()
                    .unwrap_or(Value::Nil),
                _ => err(VibeError::attribute_error(
                    "no self in this context",
                    pos.line,
                    pos.column,
                )),
            },
            Expr::ArrayLit { elements, .. } => {
                let mut items = Vec::with_capacity(elements.len());
                for e in elements {
                    let v = self.eval_expr(e, env, ctx);
                    if v.is_error() {
                        return v;
                    }
                    items.push(v);
                }
                Value::array(items)
            }
            Expr::Binary {
                left, op, right, pos,
            } => self.eval_binary(left, op, right, *pos, env, ctx),
            Expr::Unary { op, operand, pos } => self.eval_unary(op, operand, *pos, env, ctx),
            Expr::Call { callee, args, pos } => self.eval_call(callee, args, *pos, env, ctx),
            Expr::Index { target, index, pos } => {
                let t = self.eval_expr(target, env, ctx);
                if t.is_error() {
                    return t;
                }
                let i = self.eval_expr(index, env, ctx);
                if i.is_error() {
                    return i;
                }
                match (&t, &i) {
                    (Value::Array(items), Value::Integer(idx)) => {
                        let items = items.borrow();
                        if *idx >= 0 && (*idx as usize) < items.len() {
                            items[*idx as usize].clone()
                        } else {
                            Value::Nil
                        }
                    }
                    (Value::Array(_), _) => type_error_at(*pos, "array index must be an integer"),
                    (other, _) => type_error_at(
                        *pos,
                        format!("cannot index into value of type {}", other.type_name()),
                    ),
                }
            }
            Expr::Dot { target, field, pos } => {
                let t = self.eval_expr(target, env, ctx);
                if t.is_error() {
                    return t;
                }
                match &t {
                    Value::Instance(inst) => {
                        if let Some(v) = inst.fields.borrow().get(field) {
                            return v.clone();
                        }
                        if let Some(m) = inst.class.find_method(field) {
                            return Value::BoundMethod(inst.clone(), m);
                        }
                        err(VibeError::attribute_error(
                            format!("no field or method '{}' on {}", field, inst.class.name),
                            pos.line,
                            pos.column,
                        ))
                    }
                    other => err(VibeError::attribute_error(
                        format!("no field '{}' on value of type {}", field, other.type_name()),
                        pos.line,
                        pos.column,
                    )),
                }
            }
            Expr::MethodCall {
                receiver,
                method,
                args,
                pos,
            } => self.eval_method_call(receiver, method, args, *pos, env, ctx),
            Expr::SuperCall { method, args, pos } => {
                self.eval_super_call(method, args, *pos, env, ctx)
            }
            Expr::ClassInstantiation {
                class_name,
                args,
                pos,
            } => self.eval_class_instantiation(class_name, args, *pos, env, ctx),
        }
    }

    fn eval_binary(
        &self,
        left: &Expr,
        op: &BinOp,
        right: &Expr,
        pos: Position,
        env: &Rc<Environment>,
        ctx: &CallCtx,
    ) -> Value {
        let l = self.eval_expr(left, env, ctx);
        if l.is_error() {
            return l;
        }

        if matches!(op, BinOp::And | BinOp::Or) {
            let lb = match &l {
                Value::Boolean(b) => *b,
                other => {
                    return type_error_at(
                        pos,
                        format!("'{}' requires boolean operands, got {}", op, other.type_name()),
                    )
                }
            };
            if *op == BinOp::And && !lb {
                return Value::Boolean(false);
            }
            if *op == BinOp::Or && lb {
                return Value::Boolean(true);
            }
            let r = self.eval_expr(right, env, ctx);
            if r.is_error() {
                return r;
            }
            return match &r {
                Value::Boolean(b) => Value::Boolean(*b),
                other => type_error_at(
                    pos,
                    format!("'{}' requires boolean operands, got {}", op, other.type_name()),
                ),
            };
        }

        let r = self.eval_expr(right, env, ctx);
        if r.is_error() {
            return r;
        }

        match op {
            BinOp::Add => match (&l, &r) {
                (Value::Str(a), Value::Str(b)) => Value::Str(format!("{}{}", a, b)),
                (Value::Array(a), Value::Array(b)) => {
                    let mut items = a.borrow().clone();
                    items.extend(b.borrow().clone());
                    Value::array(items)
                }
                _ => numeric_binop(&l, &r, pos, "+", |a, b| a.checked_add(b), |a, b| a + b),
            },
            BinOp::Sub => numeric_binop(&l, &r, pos, "-", |a, b| a.checked_sub(b), |a, b| a - b),
            BinOp::Mul => numeric_binop(&l, &r, pos, "*", |a, b| a.checked_mul(b), |a, b| a * b),
            BinOp::Div => match (as_f64(&l), as_f64(&r)) {
                (Some(a), Some(b)) => {
                    if b == 0.0 {
                        return err(VibeError::DivisionByZero {
                            line: pos.line,
                            column: pos.column,
                        });
                    }
                    match (&l, &r) {
                        (Value::Integer(a), Value::Integer(b)) => Value::Integer(a / b),
                        _ => Value::Float(a / b),
                    }
                }
                _ => type_mismatch_numeric(&l, &r, pos, "/"),
            },
            BinOp::Mod => match (as_f64(&l), as_f64(&r)) {
                (Some(_), Some(b)) if b == 0.0 => err(VibeError::DivisionByZero {
                    line: pos.line,
                    column: pos.column,
                }),
                (Some(_), Some(_)) => match (&l, &r) {
                    (Value::Integer(a), Value::Integer(b)) => Value::Integer(a % b),
                    (a, b) => Value::Float(as_f64(a).unwrap() % as_f64(b).unwrap()),
                },
                _ => type_mismatch_numeric(&l, &r, pos, "%"),
            },
            BinOp::Pow => match (&l, &r) {
                (Value::Integer(a), Value::Integer(b)) if *b >= 0 => {
                    Value::Integer(a.checked_pow(*b as u32).unwrap_or(i64::MAX))
                }
                _ => match (as_f64(&l), as_f64(&r)) {
                    (Some(a), Some(b)) => Value::Float(a.powf(b)),
                    _ => type_mismatch_numeric(&l, &r, pos, "**"),
                },
            },
            BinOp::Eq => Value::Boolean(l == r),
            BinOp::NotEq => Value::Boolean(l != r),
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => compare(&l, &r, op, pos),
            BinOp::Range => match (&l, &r) {
                (Value::Integer(a), Value::Integer(b)) => {
                    let items = if a <= b {
                        (*a..=*b).map(Value::Integer).collect()
                    } else {
                        Vec::new()
                    };
                    Value::array(items)
                }
                _ => type_error_at(pos, "'..' requires two integers"),
            },
            BinOp::And | BinOp::Or => unreachable!("handled above with short-circuiting"),
        }
    }

    fn eval_unary(
        &self,
        op: &UnOp,
        operand: &Expr,
        pos: Position,
        env: &Rc<Environment>,
        ctx: &CallCtx,
    ) -> Value {
        let v = self.eval_expr(operand, env, ctx);
        if v.is_error() {
            return v;
        }
        match op {
            UnOp::Neg => match v {
                Value::Integer(n) => Value::Integer(-n),
                Value::Float(n) => Value::Float(-n),
                other => type_error_at(
                    pos,
                    format!("unary '-' requires a numeric operand, got {}", other.type_name()),
                ),
            },
            UnOp::Not => match v {
                Value::Boolean(b) => Value::Boolean(!b),
                other => type_error_at(
                    pos,
                    format!("unary '!' requires a boolean operand, got {}", other.type_name()),
                ),
            },
        }
    }

    fn eval_call(
        &self,
        callee: &Expr,
        args: &[Expr],
        pos: Position,
        env: &Rc<Environment>,
        ctx: &CallCtx,
    ) -> Value {
        let callee_v = self.eval_expr(callee, env, ctx);
        if callee_v.is_error() {
            return callee_v;
        }
        let mut arg_values = Vec::with_capacity(args.len());
        for a in args {
            let v = self.eval_expr(a, env, ctx);
            if v.is_error() {
                return v;
            }
            arg_values.push(v);
        }
        match callee_v {
            Value::Function(func) => self.call_function(&func, arg_values, None, None, pos),
            Value::BoundMethod(inst, func) => {
                let owner = func.owner.borrow().clone();
                self.call_function(&func, arg_values, Some(Value::Instance(inst)), owner, pos)
            }
            _ => err(VibeError::NotCallable {
                line: pos.line,
                column: pos.column,
            }),
        }
    }

    fn eval_method_call(
        &self,
        receiver: &Expr,
        method: &str,
        args: &[Expr],
        pos: Position,
        env: &Rc<Environment>,
        ctx: &CallCtx,
    ) -> Value {
        let recv = self.eval_expr(receiver, env, ctx);
        if recv.is_error() {
            return recv;
        }
        let mut arg_values = Vec::with_capacity(args.len());
        for a in args {
            let v = self.eval_expr(a, env, ctx);
            if v.is_error() {
                return v;
            }
            arg_values.push(v);
        }

        match &recv {
            Value::Array(items) => match method {
                "length" => {
                    if !arg_values.is_empty() {
                        return err(VibeError::arity_error("0", arg_values.len(), pos.line, pos.column));
                    }
                    Value::Integer(items.borrow().len() as i64)
                }
                other => err(VibeError::attribute_error(
                    format!("array has no method '{}'", other),
                    pos.line,
                    pos.column,
                )),
            },
            Value::Instance(inst) => match inst.class.find_method(method) {
                Some(func) => {
                    let owner = func.owner.borrow().clone();
                    self.call_function(&func, arg_values, Some(recv.clone()), owner, pos)
                }
                None => err(VibeError::attribute_error(
                    format!("no method '{}' on {}", method, inst.class.name),
                    pos.line,
                    pos.column,
                )),
            },
            other => err(VibeError::attribute_error(
                format!("no method '{}' on value of type {}", method, other.type_name()),
                pos.line,
                pos.column,
            )),
        }
    }

    fn eval_super_call(
        &self,
        method: &str,
        args: &[Expr],
        pos: Position,
        env: &Rc<Environment>,
        ctx: &CallCtx,
    ) -> Value {
        let Some(defining_class) = &ctx.defining_class else {
            return err(VibeError::attribute_error(
                "'super' used outside of a method",
                pos.line,
                pos.column,
            ));
        };
        let Some(parent) = &defining_class.parent else {
            return err(VibeError::attribute_error(
                format!("{} has no superclass", defining_class.name),
                pos.line,
                pos.column,
            ));
        };
        let Some(func) = parent.find_method(method) else {
            return err(VibeError::attribute_error(
                format!("no method '{}' on superclass {}", method, parent.name),
                pos.line,
                pos.column,
            ));
        };

        let mut arg_values = Vec::with_capacity(args.len());
        for a in args {
            let v = self.eval_expr(a, env, ctx);
            if v.is_error() {
                return v;
            }
            arg_values.push(v);
        }
        let owner = func.owner.borrow().clone();
        self.call_function(&func, arg_values, ctx.self_value.clone(), owner, pos)
    }

    fn eval_class_instantiation(
        &self,
        class_name: &str,
        args: &[Expr],
        pos: Position,
        env: &Rc<Environment>,
        ctx: &CallCtx,
    ) -> Value {
        let class = match env.get(class_name) {
            Some(Value::Class(class)) => class,
            Some(_) => {
                return err(VibeError::type_error(
                    format!("'{}' is not a class", class_name),
                    pos.line,
                    pos.column,
                ))
            }
            None => return err(VibeError::name_error(class_name, pos.line, pos.column)),
        };

        let mut arg_values = Vec::with_capacity(args.len());
        for a in args {
            let v = self.eval_expr(a, env, ctx);
            if v.is_error() {
                return v;
            }
            arg_values.push(v);
        }

        let mut fields = HashMap::new();
        for name in all_ivars(&class) {
            fields.insert(name, Value::Nil);
        }
        let instance = Rc::new(Instance {
            class: class.clone(),
            fields: RefCell::new(fields),
        });

        if let Some(init) = class.find_method("init") {
            let owner = init.owner.borrow().clone();
            let result = self.call_function(
                &init,
                arg_values,
                Some(Value::Instance(instance.clone())),
                owner,
                pos,
            );
            if result.is_error() {
                return result;
            }
        }

        Value::Instance(instance)
    }

    fn call_function(
        &self,
        func: &Rc<Function>,
        args: Vec<Value>,
        self_value: Option<Value>,
        defining_class: Option<Rc<Class>>,
        pos: Position,
    ) -> Value {
        let params = &func.def.params;
        if params.len() != args.len() {
            return err(VibeError::arity_error(
                params.len().to_string(),
                args.len(),
                pos.line,
                pos.column,
            ));
        }

        let call_env = Environment::with_parent(func.closure.clone());
        for (param, arg) in params.iter().zip(args.into_iter()) {
            if let Some(ann) = &param.type_annotation {
                let declared = type_from_annotation(ann);
                if !Type::of_value(&arg).is_assignable_to(&declared) {
                    return type_error_at(
                        pos,
                        format!(
                            "cannot assign {} to {}",
                            Type::of_value(&arg).to_string().to_lowercase(),
                            declared.to_string().to_lowercase()
                        ),
                    );
                }
                call_env.define_typed(param.name.clone(), arg, declared);
            } else {
                call_env.define(param.name.clone(), arg);
            }
        }

        let call_ctx = CallCtx {
            self_value,
            defining_class,
        };
        let result = self.eval_block(&func.def.body, &call_env, &call_ctx);
        let result = match result {
            Value::Return(inner) => *inner,
            other => other,
        };
        if result.is_error() {
            return result;
        }

        if let Some(ret_ann) = &func.def.return_type {
            let declared = type_from_annotation(ret_ann);
            if !Type::of_value(&result).is_assignable_to(&declared) {
                return type_error_at(
                    pos,
                    format!(
                        "cannot return {} where {} is expected",
                        Type::of_value(&result).to_string().to_lowercase(),
                        declared.to_string().to_lowercase()
                    ),
                );
            }
        }
        result
    }

    fn eval_class_def(&self, class_def: &ClassDef, env: &Rc<Environment>) {
        let parent = match &class_def.parent {
            Some(name) => match env.get(name) {
                Some(Value::Class(parent)) => Some(parent),
                _ => None,
            },
            None => None,
        };

        let mut methods = HashMap::new();
        for method_def in &class_def.methods {
            let func = Rc::new(Function {
                def: Rc::new(method_def.clone()),
                closure: env.clone(),
                owner: RefCell::new(None),
            });
            methods.insert(method_def.name.clone(), func);
        }

        let class = Rc::new(Class {
            name: class_def.name.clone(),
            parent,
            methods,
            ivars: class_def.ivars.clone(),
        });
        for func in class.methods.values() {
            *func.owner.borrow_mut() = Some(class.clone());
        }

        env.define(class_def.name.clone(), Value::Class(class));
    }

    fn eval_require(&self, path: &str, pos: Position, env: &Rc<Environment>) -> Value {
        let source = match self.resolver.resolve(path) {
            Ok(source) => source,
            Err(message) => return err(VibeError::require_error(message, pos.line, pos.column)),
        };
        let (program, errors) = crate::parser::parse(&source);
        if let Some(first) = errors.into_iter().next() {
            return err(VibeError::require_error(
                format!("failed to parse '{}': {}", path, first),
                pos.line,
                pos.column,
            ));
        }
        // Executes directly into the caller's root environment: the
        // simplest model the design notes sanction for making `require`'d
        // definitions visible (spec.md §4.5, §9).
        let root = env.root();
        self.evaluate(&program, &root)
    }
}

/// REPL-friendly entry point (spec.md §1): parses one logical input unit
/// and, if it parsed cleanly, evaluates it against `env` in place — the
/// same long-lived environment the REPL reuses across units. A non-empty
/// error list means the caller should re-prompt without touching `env`.
pub fn evaluate_incremental(
    evaluator: &Evaluator,
    env: &Rc<Environment>,
    source: &str,
) -> Result<Value, Vec<VibeError>> {
    let (program, errors) = crate::parser::parse(source);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(evaluator.evaluate(&program, env))
}

fn all_ivars(class: &Rc<Class>) -> Vec<String> {
    let mut seen = Vec::new();
    let mut current = Some(class.clone());
    while let Some(c) = current {
        for name in &c.ivars {
            if !seen.contains(name) {
                seen.push(name.clone());
            }
        }
        current = c.parent.clone();
    }
    seen
}

pub fn type_from_annotation(ann: &TypeAnnotation) -> Type {
    let generics: Vec<Type> = ann.generics.iter().map(type_from_annotation).collect();
    Type::from_name(&ann.name, &generics)
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Integer(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        _ => None,
    }
}

fn numeric_binop(
    l: &Value,
    r: &Value,
    pos: Position,
    op_name: &str,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Value {
    match (l, r) {
        (Value::Integer(a), Value::Integer(b)) => match int_op(*a, *b) {
            Some(v) => Value::Integer(v),
            None => Value::Integer(if *a > 0 { i64::MAX } else { i64::MIN }),
        },
        _ => match (as_f64(l), as_f64(r)) {
            (Some(a), Some(b)) => Value::Float(float_op(a, b)),
            _ => type_mismatch_numeric(l, r, pos, op_name),
        },
    }
}

fn type_mismatch_numeric(l: &Value, r: &Value, pos: Position, op_name: &str) -> Value {
    type_error_at(
        pos,
        format!(
            "'{}' requires two numerics (or two strings for '+'), got {} and {}",
            op_name,
            l.type_name(),
            r.type_name()
        ),
    )
}

fn compare(l: &Value, r: &Value, op: &BinOp, pos: Position) -> Value {
    let ordering = match (l, r) {
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        _ => match (as_f64(l), as_f64(r)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return type_error_at(
                    pos,
                    format!(
                        "'{}' requires two numerics or two strings, got {} and {}",
                        op,
                        l.type_name(),
                        r.type_name()
                    ),
                )
            }
        },
    };
    let Some(ordering) = ordering else {
        return type_error_at(pos, format!("'{}' cannot compare {} and {}", op, l.type_name(), r.type_name()));
    };
    let result = match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::LtEq => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::GtEq => ordering.is_ge(),
        _ => unreachable!("compare only called for ordering operators"),
    };
    Value::Boolean(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullResolver;
    impl ModuleResolver for NullResolver {
        fn resolve(&self, path: &str) -> Result<String, String> {
            Err(format!("module not found: {}", path))
        }
    }

    fn run(source: &str) -> Value {
        let (program, errors) = crate::parser::parse(source);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        let env = Environment::new();
        let evaluator = Evaluator::new(&NullResolver);
        evaluator.evaluate(&program, &env)
    }

    #[test]
    fn integer_arithmetic_stays_integer() {
        assert_eq!(run("1 + 2 * 3"), Value::Integer(7));
    }

    #[test]
    fn mixed_arithmetic_widens_to_float() {
        assert_eq!(run("1 + 2.0"), Value::Float(3.0));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(run("1 / 0").is_error());
    }

    #[test]
    fn out_of_range_index_is_nil() {
        assert_eq!(run("[1, 2, 3][10]"), Value::Nil);
    }

    #[test]
    fn array_append_at_length() {
        assert_eq!(
            run("a = [1, 2]\na[2] = 3\na[2]"),
            Value::Integer(3)
        );
    }

    #[test]
    fn closures_capture_environment() {
        let result = run(
            "def make_adder(n)\n  def adder(x)\n    return x + n\n  end\n  return adder\nend\nadd5 = make_adder(5)\nadd5(10)",
        );
        assert_eq!(result, Value::Integer(15));
    }

    #[test]
    fn if_else_and_truthiness() {
        assert_eq!(run("if nil\n  1\nelse\n  2\nend"), Value::Integer(2));
        assert_eq!(run("if 0\n  1\nelse\n  2\nend"), Value::Integer(1));
    }

    #[test]
    fn while_loop_accumulates() {
        assert_eq!(
            run("i = 0\nsum = 0\nwhile i < 5 do\n  sum = sum + i\n  i = i + 1\nend\nsum"),
            Value::Integer(10)
        );
    }

    #[test]
    fn for_loop_over_range() {
        assert_eq!(
            run("total = 0\nfor i in 1..3 do\n  total = total + i\nend\ntotal"),
            Value::Integer(6)
        );
    }

    #[test]
    fn classes_support_inheritance_and_super() {
        let result = run(
            "class Animal\n  def speak()\n    return \"...\"\n  end\nend\nclass Dog < Animal\n  def speak()\n    return super.speak() + \" woof\"\n  end\nend\nd = Dog.new()\nd.speak()",
        );
        assert_eq!(result, Value::Str("... woof".to_string()));
    }

    #[test]
    fn instance_vars_default_to_nil_and_are_mutable() {
        let result = run(
            "class Counter\n  @count\n  def init()\n    @count = 0\n  end\n  def bump()\n    @count = @count + 1\n    return @count\n  end\nend\nc = Counter.new()\nc.bump()\nc.bump()",
        );
        assert_eq!(result, Value::Integer(2));
    }

    #[test]
    fn array_length_method() {
        assert_eq!(run("[1, 2, 3].length()"), Value::Integer(3));
    }

    #[test]
    fn typed_var_decl_rejects_mismatched_type() {
        assert!(run("x: Int = \"hi\"").is_error());
    }

    #[test]
    fn int_widens_to_float_annotation() {
        assert_eq!(run("x: Float = 3\nx"), Value::Float(3.0));
    }

    #[test]
    fn function_arity_mismatch_is_an_error() {
        assert!(run("def f(a, b)\n  return a\nend\nf(1)").is_error());
    }

    #[test]
    fn logical_and_short_circuits() {
        assert_eq!(run("false && (1 / 0 == 0)"), Value::Boolean(false));
    }

    #[test]
    fn evaluate_incremental_shares_env_across_units() {
        let env = Environment::new();
        let evaluator = Evaluator::new(&NullResolver);
        assert_eq!(
            evaluate_incremental(&evaluator, &env, "x = 5"),
            Ok(Value::Integer(5))
        );
        assert_eq!(
            evaluate_incremental(&evaluator, &env, "x + 1"),
            Ok(Value::Integer(6))
        );
    }

    #[test]
    fn evaluate_incremental_reports_parse_errors_without_touching_env() {
        let env = Environment::new();
        let evaluator = Evaluator::new(&NullResolver);
        assert!(evaluate_incremental(&evaluator, &env, "if\nend").is_err());
        assert!(env.get("x").is_none());
    }
}
