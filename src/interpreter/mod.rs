//! Tree-walking evaluator: AST -> side effects.
//!
//! Dispatch is by AST-variant match (the exhaustive-match reading of the
//! teacher's reflective `visit_*` convention, per spec.md §4.4). Grounded
//! on the teacher's `Interpreter`/`Scope` (`run_statement`/`run_expression`
//! over a scope stack, `src/interpreter/mod.rs`) and on
//! `examples/original_source/interpreter.py` for the exact operational
//! semantics of every node.

mod environment;
mod value;

pub use value::{FunctionValue, Value};

use std::rc::Rc;

use crate::ast::{CompareOp, Node};
use crate::error::InterpreterError;
use crate::lexer::Num;

use environment::{ARKind, ActivationRecord, Env};

type IResult<T> = Result<T, InterpreterError>;

/// Result of evaluating a statement-shaped node: either nothing of note
/// happened (`Normal`), or a non-local control-flow transfer is under way.
/// This is the tagged-variant replacement for the source's sentinel
/// objects, per spec.md §9.
#[derive(Debug)]
enum Signal {
    Normal,
    Break,
    Continue,
    Return(Value),
}

pub struct Interpreter {
    call_stack: Vec<ActivationRecord>,
    debug: bool,
}

impl Interpreter {
    pub fn new(debug: bool) -> Self {
        Self {
            call_stack: vec![],
            debug,
        }
    }

    fn current_env(&self) -> Env {
        self.call_stack
            .last()
            .expect("activation-record stack is non-empty while running")
            .environment
            .clone()
    }

    fn current_nesting_level(&self) -> usize {
        self.call_stack
            .last()
            .expect("activation-record stack is non-empty while running")
            .nesting_level
    }

    /// Dump the activation-record stack, innermost first, for `--debug`.
    fn dump_call_stack(&self) {
        for frame in self.call_stack.iter().rev() {
            log::debug!("{}", "-".repeat(20));
            log::debug!("{frame}");
        }
    }

    pub fn run(&mut self, program: &Node) -> IResult<()> {
        let Node::Program { declarations, .. } = program else {
            panic!("Interpreter::run expects a Program node");
        };

        self.call_stack
            .push(ActivationRecord::new("main", ARKind::Program, 1, None));

        let mut outcome = Ok(());
        for declaration in declarations {
            match self.exec(declaration) {
                Ok(_) => {}
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        if outcome.is_err() && self.debug {
            self.dump_call_stack();
        }

        self.call_stack.pop();
        outcome
    }

    /// Statement-shaped dispatch: `VarDecl`, `FuncDecl`, `If`, `While`,
    /// `RangeFor`, `Return`, `Break`, `Continue`, `Block`, and (falling
    /// through) a bare expression used for its side effect, whose value is
    /// discarded.
    fn exec(&mut self, node: &Node) -> IResult<Signal> {
        match node {
            Node::VarDecl { name, init, .. } => {
                let value = match init {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                environment::declare(&self.current_env(), name, value);
                Ok(Signal::Normal)
            }
            Node::FuncDecl {
                name, params, body, ..
            } => {
                let func = Rc::new(FunctionValue {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::new((**body).clone()),
                    closure: self.current_env(),
                });
                environment::declare(&self.current_env(), name, Value::Function(func));
                Ok(Signal::Normal)
            }
            Node::If {
                arm, elifs, else_block, ..
            } => {
                if self.eval(&arm.condition)?.truthy() {
                    return self.exec(&arm.block);
                }
                for elif in elifs {
                    if self.eval(&elif.condition)?.truthy() {
                        return self.exec(&elif.block);
                    }
                }
                match else_block {
                    Some(block) => self.exec(block),
                    None => Ok(Signal::Normal),
                }
            }
            Node::While { condition, block, .. } => {
                while self.eval(condition)?.truthy() {
                    match self.exec(block)? {
                        Signal::Return(v) => return Ok(Signal::Return(v)),
                        Signal::Break => break,
                        Signal::Continue => continue,
                        Signal::Normal => {}
                    }
                }
                Ok(Signal::Normal)
            }
            Node::RangeFor {
                var, iterable, block, position,
            } => self.exec_range_for(var, iterable, block, *position),
            Node::Return { value, .. } => {
                let in_function = self
                    .call_stack
                    .iter()
                    .rev()
                    .any(|frame| frame.kind == ARKind::Function);
                if !in_function {
                    return Err(InterpreterError::new("'return' outside function"));
                }
                let value = self.eval(value)?;
                Ok(Signal::Return(value))
            }
            Node::Break { .. } => Ok(Signal::Break),
            Node::Continue { .. } => Ok(Signal::Continue),
            Node::Block { declarations, .. } => self.exec_block(declarations),
            other => {
                self.eval(other)?;
                Ok(Signal::Normal)
            }
        }
    }

    /// Every `Block` (function bodies, if/elif/else arms, loop bodies)
    /// pushes a fresh activation record and pops it on every exit path,
    /// including error propagation, per spec.md §5's scoped-resource
    /// discipline.
    fn exec_block(&mut self, declarations: &[Node]) -> IResult<Signal> {
        let level = self.current_nesting_level() + 1;
        let outer = self.current_env();
        self.call_stack
            .push(ActivationRecord::new("<block>", ARKind::Block, level, Some(outer)));

        let mut result = Ok(Signal::Normal);
        for declaration in declarations {
            match self.exec(declaration) {
                Ok(Signal::Normal) => continue,
                Ok(signal) => {
                    result = Ok(signal);
                    break;
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        self.call_stack.pop();
        result
    }

    fn exec_range_for(
        &mut self,
        var: &str,
        iterable: &Node,
        block: &Node,
        position: crate::lexer::Position,
    ) -> IResult<Signal> {
        let _ = position;
        let iterable = self.eval(iterable)?;
        let items: Vec<Value> = match iterable {
            Value::Array(elements) => elements.borrow().clone(),
            other => {
                return Err(InterpreterError::new(format!(
                    "cannot iterate over value of type `{}`",
                    other.type_name()
                )))
            }
        };

        let env = self.current_env();
        for item in items {
            environment::declare(&env, var, item);
            let signal = self.exec(block);
            environment::undeclare(&env, var);
            match signal? {
                Signal::Return(v) => return Ok(Signal::Return(v)),
                Signal::Break => break,
                Signal::Continue => continue,
                Signal::Normal => {}
            }
        }
        Ok(Signal::Normal)
    }

    /// Expression-shaped dispatch: everything that produces a `Value`.
    fn eval(&mut self, node: &Node) -> IResult<Value> {
        match node {
            Node::Number { value, .. } => Ok(Value::Number(*value)),
            Node::String { text, .. } => Ok(Value::Str(strip_quotes(text))),
            Node::True { .. } => Ok(Value::Bool(true)),
            Node::False { .. } => Ok(Value::Bool(false)),
            Node::Nil { .. } => Ok(Value::Nil),
            Node::Identifier { name, .. } => environment::get(&self.current_env(), name)
                .ok_or_else(|| InterpreterError::new(format!("Identifier `{name}` is not defined"))),
            Node::Add { left, right, .. } => self.arith(left, right, "add", |a, b| a + b, |a, b| a + b),
            Node::Sub { left, right, .. } => self.arith(left, right, "subtract", |a, b| a - b, |a, b| a - b),
            Node::Mul { left, right, .. } => self.arith(left, right, "multiply", |a, b| a * b, |a, b| a * b),
            Node::Div { left, right, .. } => self.div(left, right),
            Node::Mod { left, right, .. } => self.rem(left, right),
            Node::Compare { left, right, op, .. } => self.compare(left, right, *op),
            Node::And { left, right, .. } => {
                let l = self.eval(left)?.truthy();
                let r = self.eval(right)?.truthy();
                Ok(Value::Bool(l && r))
            }
            Node::Or { left, right, .. } => {
                let l = self.eval(left)?.truthy();
                let r = self.eval(right)?.truthy();
                Ok(Value::Bool(l || r))
            }
            Node::Not { operand, .. } => Ok(Value::Bool(!self.eval(operand)?.truthy())),
            Node::Negative { operand, .. } => match self.eval(operand)? {
                Value::Number(Num::Int(v)) => Ok(Value::Number(Num::Int(-v))),
                Value::Number(Num::Float(v)) => Ok(Value::Number(Num::Float(-v))),
                other => Err(InterpreterError::new(format!(
                    "cannot negate value of type `{}`",
                    other.type_name()
                ))),
            },
            Node::FunctionCall {
                callee, arguments, ..
            } => self.eval_call(callee, arguments),
            Node::ArrayAccess { base, index, .. } => self.eval_index(base, index),
            Node::Array { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval(element)?);
                }
                Ok(Value::array(values))
            }
            Node::Assign { target, value, .. } => self.eval_assign(target, value),
            Node::Expr { inner, .. } => self.eval(inner),
            other => unreachable!("{} is a statement, not an expression", other.variant_name()),
        }
    }

    fn arith(
        &mut self,
        left: &Node,
        right: &Node,
        verb: &str,
        int_op: impl Fn(i64, i64) -> i64,
        float_op: impl Fn(f64, f64) -> f64,
    ) -> IResult<Value> {
        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match (l, r) {
            (Value::Number(Num::Int(a)), Value::Number(Num::Int(b))) => Ok(Value::Number(Num::Int(int_op(a, b)))),
            (Value::Number(a), Value::Number(b)) => {
                Ok(Value::Number(Num::Float(float_op(to_f64(a), to_f64(b)))))
            }
            (l, r) => Err(InterpreterError::new(format!(
                "type mismatch in arithmetic: cannot {verb} `{}` and `{}`",
                l.type_name(),
                r.type_name()
            ))),
        }
    }

    fn div(&mut self, left: &Node, right: &Node) -> IResult<Value> {
        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match (l, r) {
            (Value::Number(Num::Int(_)), Value::Number(Num::Int(0))) => {
                Err(InterpreterError::new("division by zero"))
            }
            (Value::Number(Num::Int(a)), Value::Number(Num::Int(b))) => Ok(Value::Number(Num::Int(a / b))),
            (Value::Number(a), Value::Number(b)) => {
                Ok(Value::Number(Num::Float(to_f64(a) / to_f64(b))))
            }
            (l, r) => Err(InterpreterError::new(format!(
                "type mismatch in arithmetic: cannot divide `{}` and `{}`",
                l.type_name(),
                r.type_name()
            ))),
        }
    }

    fn rem(&mut self, left: &Node, right: &Node) -> IResult<Value> {
        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match (l, r) {
            (Value::Number(Num::Int(_)), Value::Number(Num::Int(0))) => {
                Err(InterpreterError::new("division by zero"))
            }
            (Value::Number(Num::Int(a)), Value::Number(Num::Int(b))) => Ok(Value::Number(Num::Int(a % b))),
            (Value::Number(a), Value::Number(b)) => {
                Ok(Value::Number(Num::Float(to_f64(a) % to_f64(b))))
            }
            (l, r) => Err(InterpreterError::new(format!(
                "type mismatch in arithmetic: cannot compute `{}` mod `{}`",
                l.type_name(),
                r.type_name()
            ))),
        }
    }

    fn compare(&mut self, left: &Node, right: &Node, op: CompareOp) -> IResult<Value> {
        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match op {
            CompareOp::Equal => Ok(Value::Bool(value_eq(&l, &r))),
            CompareOp::NotEqual => Ok(Value::Bool(!value_eq(&l, &r))),
            _ => {
                let (a, b) = match (&l, &r) {
                    (Value::Number(a), Value::Number(b)) => (to_f64(*a), to_f64(*b)),
                    _ => {
                        return Err(InterpreterError::new(format!(
                            "unknown Compare op_type `{op}`: cannot order `{}` and `{}`",
                            l.type_name(),
                            r.type_name()
                        )))
                    }
                };
                let result = match op {
                    CompareOp::Less => a < b,
                    CompareOp::LessEqual => a <= b,
                    CompareOp::Greater => a > b,
                    CompareOp::GreaterEqual => a >= b,
                    CompareOp::Equal | CompareOp::NotEqual => unreachable!(),
                };
                Ok(Value::Bool(result))
            }
        }
    }

    fn eval_call(&mut self, callee: &Node, arguments: &[Node]) -> IResult<Value> {
        if let Node::Identifier { name, .. } = callee {
            match name.as_str() {
                "print" => return self.builtin_print(arguments),
                "range" => return self.builtin_range(arguments),
                _ => {
                    let Some(value) = environment::get(&self.current_env(), name) else {
                        return Err(InterpreterError::new(format!("Function `{name}` is not defined")));
                    };
                    let Value::Function(func) = value else {
                        return Err(InterpreterError::new(format!("`{name}` is not a function")));
                    };
                    return self.call_function(func, arguments);
                }
            }
        }

        match self.eval(callee)? {
            Value::Function(func) => self.call_function(func, arguments),
            other => Err(InterpreterError::new(format!(
                "value of type `{}` is not callable",
                other.type_name()
            ))),
        }
    }

    /// Pushes a FUNCTION activation record, binds formal parameters by
    /// zipping with evaluated arguments (excess parameters bind to
    /// nothing, excess arguments are ignored), evaluates the body (which
    /// pushes its own nested BLOCK record), and pops.
    fn call_function(&mut self, func: Rc<FunctionValue>, arguments: &[Node]) -> IResult<Value> {
        let mut values = Vec::with_capacity(arguments.len());
        for arg in arguments {
            values.push(self.eval(arg)?);
        }

        let level = self.current_nesting_level() + 1;
        let frame = ActivationRecord::new(func.name.clone(), ARKind::Function, level, Some(func.closure.clone()));
        for (param, value) in func.params.iter().zip(values) {
            environment::declare(&frame.environment, param, value);
        }
        self.call_stack.push(frame);

        let Node::Block { declarations, .. } = func.body.as_ref() else {
            unreachable!("FuncDecl always stores a Block body");
        };
        let signal = self.exec_block(declarations);

        self.call_stack.pop();

        match signal? {
            Signal::Return(v) => Ok(v),
            _ => Ok(Value::Nil),
        }
    }

    fn eval_index(&mut self, base: &Node, index: &Node) -> IResult<Value> {
        let base = self.eval(base)?;
        let index = self.index_value(index)?;
        match base {
            Value::Array(elements) => {
                let elements = elements.borrow();
                elements
                    .get(index)
                    .cloned()
                    .ok_or_else(|| InterpreterError::new(format!("array index {index} out of bounds (len {})", elements.len())))
            }
            other => Err(InterpreterError::new(format!(
                "cannot index into value of type `{}`",
                other.type_name()
            ))),
        }
    }

    fn eval_assign(&mut self, target: &Node, value: &Node) -> IResult<Value> {
        let value = self.eval(value)?;
        match target {
            Node::Identifier { name, .. } => {
                let env = self.current_env();
                if environment::get(&env, name).is_none() {
                    return Err(InterpreterError::new(format!(
                        "Assign to an unknown variable `{name}`"
                    )));
                }
                environment::set(&env, name, value.clone());
                Ok(value)
            }
            Node::ArrayAccess { base, index, .. } => {
                let base = self.eval(base)?;
                let index = self.index_value(index)?;
                match base {
                    Value::Array(elements) => {
                        let mut elements = elements.borrow_mut();
                        if index >= elements.len() {
                            return Err(InterpreterError::new(format!(
                                "array index {index} out of bounds (len {})",
                                elements.len()
                            )));
                        }
                        elements[index] = value.clone();
                        Ok(value)
                    }
                    other => Err(InterpreterError::new(format!(
                        "cannot index into value of type `{}`",
                        other.type_name()
                    ))),
                }
            }
            other => unreachable!(
                "parser only produces Assign targets that are Identifier or ArrayAccess, got {}",
                other.variant_name()
            ),
        }
    }

    fn index_value(&mut self, index: &Node) -> IResult<usize> {
        match self.eval(index)? {
            Value::Number(Num::Int(i)) => {
                usize::try_from(i).map_err(|_| InterpreterError::new(format!("array index {i} out of bounds")))
            }
            other => Err(InterpreterError::new(format!(
                "array index must be a number, got `{}`",
                other.type_name()
            ))),
        }
    }

    /// Mirrors the original's `native_print`: every argument is followed by
    /// a space (including the last one), then a bare newline.
    fn builtin_print(&mut self, arguments: &[Node]) -> IResult<Value> {
        for arg in arguments {
            let value = self.eval(arg)?;
            let text = match &value {
                Value::Str(s) => unescape::unescape(s).unwrap_or_else(|| s.clone()),
                other => other.to_string(),
            };
            print!("{text} ");
        }
        println!();
        Ok(Value::Nil)
    }

    fn builtin_range(&mut self, arguments: &[Node]) -> IResult<Value> {
        if arguments.len() != 2 {
            return Err(InterpreterError::new(format!(
                "range expects 2 arguments, got {}",
                arguments.len()
            )));
        }
        let lo = self.eval(&arguments[0])?;
        let hi = self.eval(&arguments[1])?;
        let (lo, hi) = match (lo, hi) {
            (Value::Number(a), Value::Number(b)) => (to_i64(a), to_i64(b)),
            (l, r) => {
                return Err(InterpreterError::new(format!(
                    "range expects two numbers, got `{}` and `{}`",
                    l.type_name(),
                    r.type_name()
                )))
            }
        };
        let values = (lo..hi).map(|i| Value::Number(Num::Int(i))).collect();
        Ok(Value::array(values))
    }
}

fn strip_quotes(text: &str) -> String {
    if text.len() >= 2 {
        text[1..text.len() - 1].to_owned()
    } else {
        String::new()
    }
}

fn to_f64(n: Num) -> f64 {
    match n {
        Num::Int(v) => v as f64,
        Num::Float(v) => v,
    }
}

fn to_i64(n: Num) -> i64 {
    match n {
        Num::Int(v) => v,
        Num::Float(v) => v as i64,
    }
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => to_f64(*x) == to_f64(*y),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Nil, Value::Nil) => true,
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run_ok(src: &str) -> Interpreter {
        let tokens = Lexer::new(src).run().expect("lex");
        let ast = Parser::new(tokens).parse().expect("parse");
        let mut interpreter = Interpreter::new(false);
        interpreter.run(&ast).expect("run");
        interpreter
    }

    fn run_err(src: &str) -> InterpreterError {
        let tokens = Lexer::new(src).run().expect("lex");
        let ast = Parser::new(tokens).parse().expect("parse");
        Interpreter::new(false).run(&ast).expect_err("should fail")
    }

    #[test]
    fn fibonacci_recursion() {
        let src = "func fib(n):\n    if n < 2:\n        return n\n    return fib(n-1) + fib(n-2)\n\nvar r = fib(10)\n";
        let tokens = Lexer::new(src).run().unwrap();
        let ast = Parser::new(tokens).parse().unwrap();
        let Node::Program { declarations, .. } = &ast else {
            panic!()
        };
        let mut interpreter = Interpreter::new(false);
        interpreter.run(&ast).unwrap();
        // fib is bound in the program frame; read it back out through a
        // fresh evaluation to confirm the recursion produced 55.
        let env = interpreter.current_env();
        let _ = declarations;
        let r = environment::get(&env, "r").unwrap();
        assert!(matches!(r, Value::Number(Num::Int(55))));
    }

    #[test]
    fn while_with_break() {
        let mut interpreter = run_ok("var a = 0\nwhile true:\n    a = a + 1\n    if a == 3:\n        break\n");
        let env = interpreter.current_env();
        assert!(matches!(environment::get(&env, "a"), Some(Value::Number(Num::Int(3)))));
        let _ = &mut interpreter;
    }

    #[test]
    fn array_mutation() {
        let interpreter = run_ok("var xs = [1, 2, 3]\nxs[1] = 42\n");
        let env = interpreter.current_env();
        let Some(Value::Array(arr)) = environment::get(&env, "xs") else {
            panic!("expected array")
        };
        let arr = arr.borrow();
        assert_eq!(arr.len(), 3);
        assert!(matches!(arr[0], Value::Number(Num::Int(1))));
        assert!(matches!(arr[1], Value::Number(Num::Int(42))));
        assert!(matches!(arr[2], Value::Number(Num::Int(3))));
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let err = run_err("return 1\n");
        assert!(err.message.contains("outside function"));
    }

    #[test]
    fn bare_return_yields_nil() {
        let interpreter = run_ok("func f():\n    return\nvar got = f()\n");
        let env = interpreter.current_env();
        assert!(matches!(environment::get(&env, "got"), Some(Value::Nil)));
    }

    #[test]
    fn assignment_to_undefined_variable_is_an_error() {
        let err = run_err("a = 1\n");
        assert!(err.message.contains("unknown variable"));
    }

    #[test]
    fn out_of_bounds_index_is_an_error() {
        let err = run_err("var xs = [1]\nvar y = xs[5]\n");
        assert!(err.message.contains("out of bounds"));
    }

    #[test]
    fn lexical_scope_closes_over_definition_site() {
        // `inner` closes over `make`'s frame, not the caller's frame: a
        // second top-level variable named `x` must not leak in.
        let src = "func make(x):\n    func inner():\n        return x\n    return inner()\n\nvar x = 999\nvar got = make(5)\n";
        let tokens = Lexer::new(src).run().unwrap();
        let ast = Parser::new(tokens).parse().unwrap();
        let mut interpreter = Interpreter::new(false);
        interpreter.run(&ast).unwrap();
        let env = interpreter.current_env();
        assert!(matches!(
            environment::get(&env, "got"),
            Some(Value::Number(Num::Int(5)))
        ));
    }

    #[test]
    fn for_range_binds_and_unbinds_loop_variable() {
        let interpreter = run_ok("var total = 0\nfor i in range(0, 3):\n    total = total + i\n");
        let env = interpreter.current_env();
        assert!(matches!(environment::get(&env, "total"), Some(Value::Number(Num::Int(3)))));
        assert!(environment::get(&env, "i").is_none());
    }

    #[test]
    fn strict_and_evaluates_both_sides() {
        // Both sides must run even though the left is falsy: `hits` ends
        // up at 2, not 1, confirming no short-circuit.
        let interpreter = run_ok(
            "var hits = 0\nfunc mark():\n    hits = hits + 1\n    return true\nvar _r = mark() && mark()\n",
        );
        let env = interpreter.current_env();
        assert!(matches!(environment::get(&env, "hits"), Some(Value::Number(Num::Int(2)))));
    }
}
