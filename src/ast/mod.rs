//! Tagged-variant AST.
//!
//! One enum, `Node`, carrying a payload per variant exactly as spec.md §3
//! lists them, following the teacher's `AstNode` convention
//! (`src/ast/node.rs`): a single big enum with a `position()` accessor,
//! rather than the teacher's later one-struct-per-node-type split.

use crate::lexer::{Num, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompareOp::Less => "<",
            CompareOp::LessEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterEqual => ">=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
        };
        f.write_str(s)
    }
}

/// A single conditional arm: `(condition, block)`. Used for the primary
/// `if` arm and each `elif` arm.
#[derive(Debug, Clone)]
pub struct CondArm {
    pub condition: Box<Node>,
    pub block: Box<Node>,
}

#[derive(Debug, Clone)]
pub enum Node {
    Program {
        declarations: Vec<Node>,
        position: Position,
    },
    Block {
        declarations: Vec<Node>,
        position: Position,
    },
    VarDecl {
        name: String,
        init: Option<Box<Node>>,
        position: Position,
    },
    FuncDecl {
        name: String,
        params: Vec<String>,
        body: Box<Node>,
        position: Position,
    },
    Assign {
        target: Box<Node>,
        value: Box<Node>,
        position: Position,
    },
    If {
        arm: CondArm,
        elifs: Vec<CondArm>,
        else_block: Option<Box<Node>>,
        position: Position,
    },
    While {
        condition: Box<Node>,
        block: Box<Node>,
        position: Position,
    },
    RangeFor {
        var: String,
        iterable: Box<Node>,
        block: Box<Node>,
        position: Position,
    },
    Return {
        value: Box<Node>,
        position: Position,
    },
    Break {
        position: Position,
    },
    Continue {
        position: Position,
    },
    Expr {
        inner: Box<Node>,
        position: Position,
    },
    Add {
        left: Box<Node>,
        right: Box<Node>,
        position: Position,
    },
    Sub {
        left: Box<Node>,
        right: Box<Node>,
        position: Position,
    },
    Mul {
        left: Box<Node>,
        right: Box<Node>,
        position: Position,
    },
    Div {
        left: Box<Node>,
        right: Box<Node>,
        position: Position,
    },
    Mod {
        left: Box<Node>,
        right: Box<Node>,
        position: Position,
    },
    Compare {
        left: Box<Node>,
        right: Box<Node>,
        op: CompareOp,
        position: Position,
    },
    And {
        left: Box<Node>,
        right: Box<Node>,
        position: Position,
    },
    Or {
        left: Box<Node>,
        right: Box<Node>,
        position: Position,
    },
    Not {
        operand: Box<Node>,
        position: Position,
    },
    Negative {
        operand: Box<Node>,
        position: Position,
    },
    FunctionCall {
        callee: Box<Node>,
        arguments: Vec<Node>,
        position: Position,
    },
    ArrayAccess {
        base: Box<Node>,
        index: Box<Node>,
        position: Position,
    },
    Array {
        elements: Vec<Node>,
        position: Position,
    },
    Identifier {
        name: String,
        position: Position,
    },
    Number {
        value: Num,
        position: Position,
    },
    /// Literal text with its enclosing quotes still attached; stripped at
    /// evaluation time.
    String {
        text: String,
        position: Position,
    },
    True {
        position: Position,
    },
    False {
        position: Position,
    },
    Nil {
        position: Position,
    },
}

impl Node {
    pub fn position(&self) -> Position {
        use Node::*;
        match self {
            Program { position, .. }
            | Block { position, .. }
            | VarDecl { position, .. }
            | FuncDecl { position, .. }
            | Assign { position, .. }
            | If { position, .. }
            | While { position, .. }
            | RangeFor { position, .. }
            | Return { position, .. }
            | Break { position }
            | Continue { position }
            | Expr { position, .. }
            | Add { position, .. }
            | Sub { position, .. }
            | Mul { position, .. }
            | Div { position, .. }
            | Mod { position, .. }
            | Compare { position, .. }
            | And { position, .. }
            | Or { position, .. }
            | Not { position, .. }
            | Negative { position, .. }
            | FunctionCall { position, .. }
            | ArrayAccess { position, .. }
            | Array { position, .. }
            | Identifier { position, .. }
            | Number { position, .. }
            | String { position, .. }
            | True { position }
            | False { position }
            | Nil { position } => *position,
        }
    }

    /// Name of this variant, used by `--ast` dumps and error messages —
    /// this is what subsumes the teacher's reflective `visit_Unknown`
    /// fallback (every variant is handled, so there is nothing left
    /// "unknown").
    pub fn variant_name(&self) -> &'static str {
        use Node::*;
        match self {
            Program { .. } => "Program",
            Block { .. } => "Block",
            VarDecl { .. } => "VarDecl",
            FuncDecl { .. } => "FuncDecl",
            Assign { .. } => "Assign",
            If { .. } => "If",
            While { .. } => "While",
            RangeFor { .. } => "RangeFor",
            Return { .. } => "Return",
            Break { .. } => "Break",
            Continue { .. } => "Continue",
            Expr { .. } => "Expr",
            Add { .. } => "Add",
            Sub { .. } => "Sub",
            Mul { .. } => "Mul",
            Div { .. } => "Div",
            Mod { .. } => "Mod",
            Compare { .. } => "Compare",
            And { .. } => "And",
            Or { .. } => "Or",
            Not { .. } => "Not",
            Negative { .. } => "Negative",
            FunctionCall { .. } => "FunctionCall",
            ArrayAccess { .. } => "ArrayAccess",
            Array { .. } => "Array",
            Identifier { .. } => "Identifier",
            Number { .. } => "Number",
            String { .. } => "String",
            True { .. } => "True",
            False { .. } => "False",
            Nil { .. } => "Nil",
        }
    }
}
