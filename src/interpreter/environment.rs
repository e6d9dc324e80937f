//! Lexically-chained environments and the activation-record stack.
//!
//! Generalized from the teacher's flat `Scope` (`Vec<HashMap<String,
//! VariableType>>`, `src/interpreter/mod.rs`) into the richer
//! `ActivationRecord { name, kind, nesting_level, environment }` chain
//! spec.md §3 requires, using `Rc<RefCell<..>>` frames per the arena/
//! shared-ownership guidance in spec.md §9 (a `Function` value's closure
//! can legitimately outlive the frame that defined it).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::interpreter::value::Value;

#[derive(Debug)]
pub struct EnvironmentData {
    values: HashMap<String, Value>,
    outer: Option<Env>,
}

/// Shared handle to an environment frame.
pub type Env = Rc<RefCell<EnvironmentData>>;

pub fn new_env(outer: Option<Env>) -> Env {
    Rc::new(RefCell::new(EnvironmentData {
        values: HashMap::new(),
        outer,
    }))
}

/// Walk outer-pointers until `name` is found.
pub fn get(env: &Env, name: &str) -> Option<Value> {
    if let Some(value) = env.borrow().values.get(name) {
        return Some(value.clone());
    }
    let outer = env.borrow().outer.clone();
    match outer {
        Some(outer) => get(&outer, name),
        None => None,
    }
}

/// Bind `name` in this frame unconditionally, matching `VarDecl`'s
/// "unconditionally binds in the current record's environment".
pub fn declare(env: &Env, name: &str, value: Value) {
    env.borrow_mut().values.insert(name.to_owned(), value);
}

/// Walk outwards and update the innermost frame that already contains
/// `name`. Returns `false` if no frame on the chain has it.
pub fn set(env: &Env, name: &str, value: Value) -> bool {
    if env.borrow().values.contains_key(name) {
        env.borrow_mut().values.insert(name.to_owned(), value);
        return true;
    }
    let outer = env.borrow().outer.clone();
    match outer {
        Some(outer) => set(&outer, name, value),
        None => false,
    }
}

/// Remove `name` from this specific frame, used to unbind a `for`-loop
/// variable after each iteration (including abnormal exit).
pub fn undeclare(env: &Env, name: &str) {
    env.borrow_mut().values.remove(name);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ARKind {
    Program,
    Function,
    Block,
}

impl fmt::Display for ARKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ARKind::Program => "program",
            ARKind::Function => "function",
            ARKind::Block => "block",
        };
        f.write_str(s)
    }
}

/// `(name, kind, nesting_level, environment)`, per spec.md §3.
pub struct ActivationRecord {
    pub name: String,
    pub kind: ARKind,
    pub nesting_level: usize,
    pub environment: Env,
}

impl ActivationRecord {
    pub fn new(name: impl Into<String>, kind: ARKind, nesting_level: usize, outer: Option<Env>) -> Self {
        Self {
            name: name.into(),
            kind,
            nesting_level,
            environment: new_env(outer),
        }
    }
}

impl fmt::Display for ActivationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} {}", self.nesting_level, self.kind, self.name)?;
        for (k, v) in self.environment.borrow().values.iter() {
            writeln!(f, "    {k:<16}: {v}")?;
        }
        Ok(())
    }
}
