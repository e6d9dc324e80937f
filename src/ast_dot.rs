//! AST -> Graphviz DOT rendering, used by `why --ast`.
//!
//! A diagnostic-only supplement with no counterpart in spec.md's own
//! module list; grounded on
//! `examples/original_source/visualize_ast.py`'s `VisualizeAST`
//! (header/body/footer string buffers, one `node%d [label="..."]` per AST
//! node plus `node%d -> node%d` edges), re-expressed as a `match` over
//! `ast::Node` instead of reflective `visit_<ClassName>` dispatch.

use std::fmt::Write as _;

use crate::ast::Node;

const HEADER: &str = "digraph astgraph {\n  node [fontsize=12, fontname=\"Courier\", height=.1];\n\n";
const FOOTER: &str = "}\n";

/// Renders `root` to a complete `.dot` document.
pub fn render(root: &Node) -> String {
    let mut dot = AstDot::default();
    dot.visit(root);
    format!("{HEADER}{}{FOOTER}", dot.body)
}

#[derive(Default)]
struct AstDot {
    count: usize,
    body: String,
}

impl AstDot {
    fn node(&mut self, label: &str) -> usize {
        let id = self.count;
        self.count += 1;
        let _ = writeln!(self.body, "  node{id} [label=\"{}\"]", escape(label));
        id
    }

    fn edge(&mut self, from: usize, to: usize) {
        let _ = writeln!(self.body, "  node{from} -> node{to}");
    }

    fn visit_children(&mut self, parent: usize, children: &[&Node]) {
        for child in children {
            let child_id = self.visit(child);
            self.edge(parent, child_id);
        }
    }

    fn visit(&mut self, node: &Node) -> usize {
        match node {
            Node::Program { declarations, .. } => {
                let id = self.node("Program");
                for decl in declarations {
                    let child = self.visit(decl);
                    self.edge(id, child);
                }
                id
            }
            Node::Block { declarations, .. } => {
                let id = self.node("Block");
                for decl in declarations {
                    let child = self.visit(decl);
                    self.edge(id, child);
                }
                id
            }
            Node::VarDecl { name, init, .. } => {
                let id = self.node(&format!("Var {name}"));
                if let Some(init) = init {
                    let child = self.visit(init);
                    self.edge(id, child);
                }
                id
            }
            Node::FuncDecl { name, params, body, .. } => {
                let id = self.node(&format!("Func {name}"));
                let params_id = self.node(&format!("Params\\n{}", params.join(",")));
                self.edge(id, params_id);
                let body_id = self.visit(body);
                self.edge(id, body_id);
                id
            }
            Node::Assign { target, value, .. } => {
                let id = self.node(&format!("Assign\\n{}", callee_label(target)));
                let child = self.visit(value);
                self.edge(id, child);
                id
            }
            Node::If {
                arm, elifs, else_block, ..
            } => {
                let id = self.node("If");
                self.visit_children(id, &[&arm.condition, &arm.block]);
                if !elifs.is_empty() {
                    let elifs_id = self.node("[else if]");
                    self.edge(id, elifs_id);
                    for elif in elifs {
                        let cond_id = self.visit(&elif.condition);
                        self.edge(elifs_id, cond_id);
                        let block_id = self.visit(&elif.block);
                        self.edge(elifs_id, block_id);
                    }
                }
                if let Some(else_block) = else_block {
                    let child = self.visit(else_block);
                    self.edge(id, child);
                }
                id
            }
            Node::While { condition, block, .. } => {
                let id = self.node("While");
                self.visit_children(id, &[condition, block]);
                id
            }
            Node::RangeFor {
                var, iterable, block, ..
            } => {
                let id = self.node("For");
                let var_id = self.node(var);
                self.edge(id, var_id);
                self.visit_children(id, &[iterable, block]);
                id
            }
            Node::Return { value, .. } => {
                let id = self.node("Return");
                let child = self.visit(value);
                self.edge(id, child);
                id
            }
            Node::Break { .. } => self.node("Break"),
            Node::Continue { .. } => self.node("Continue"),
            Node::Expr { inner, .. } => {
                let id = self.node("Expr");
                let child = self.visit(inner);
                self.edge(id, child);
                id
            }
            Node::Add { left, right, .. } => self.binary_op("+", left, right),
            Node::Sub { left, right, .. } => self.binary_op("-", left, right),
            Node::Mul { left, right, .. } => self.binary_op("*", left, right),
            Node::Div { left, right, .. } => self.binary_op("/", left, right),
            Node::Mod { left, right, .. } => self.binary_op("%", left, right),
            Node::Compare { left, right, op, .. } => {
                let id = self.node(&format!("Compare\\n{op}"));
                self.visit_children(id, &[left, right]);
                id
            }
            Node::And { left, right, .. } => self.binary_op("And", left, right),
            Node::Or { left, right, .. } => self.binary_op("Or", left, right),
            Node::Not { operand, .. } => {
                let id = self.node("Not");
                let child = self.visit(operand);
                self.edge(id, child);
                id
            }
            Node::Negative { operand, .. } => {
                let id = self.node("Negative");
                let child = self.visit(operand);
                self.edge(id, child);
                id
            }
            Node::FunctionCall { callee, arguments, .. } => {
                let args = arguments.iter().map(callee_label).collect::<Vec<_>>().join(",");
                self.node(&format!("{}({args})", callee_label(callee)))
            }
            Node::ArrayAccess { base, index, .. } => {
                self.node(&format!("ArrayAccess\\n{}[{}]", callee_label(base), callee_label(index)))
            }
            Node::Array { elements, .. } => {
                let elements = elements.iter().map(callee_label).collect::<Vec<_>>().join(",");
                self.node(&format!("Array\\n[{elements}]"))
            }
            Node::Identifier { name, .. } => self.node(name),
            Node::Number { value, .. } => self.node(&value.to_string()),
            Node::String { text, .. } => self.node(&format!("String\\n{}", text.trim_matches('"'))),
            Node::True { .. } => self.node("True"),
            Node::False { .. } => self.node("False"),
            Node::Nil { .. } => self.node("Nil"),
        }
    }

    fn binary_op(&mut self, label: &str, left: &Node, right: &Node) -> usize {
        let id = self.node(label);
        self.visit_children(id, &[left, right]);
        id
    }
}

/// Best-effort single-line label for a node used as a call target, array
/// base, index expression or call argument, mirroring the source
/// visualiser's habit of rendering those positions as plain tokens rather
/// than recursing into a full subtree.
fn callee_label(node: &Node) -> String {
    match node {
        Node::Identifier { name, .. } => name.clone(),
        Node::Number { value, .. } => value.to_string(),
        Node::String { text, .. } => text.trim_matches('"').to_owned(),
        Node::True { .. } => "true".to_owned(),
        Node::False { .. } => "false".to_owned(),
        Node::Nil { .. } => "nil".to_owned(),
        Node::ArrayAccess { base, index, .. } => format!("{}[{}]", callee_label(base), callee_label(index)),
        other => other.variant_name().to_owned(),
    }
}

fn escape(label: &str) -> String {
    label.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    #[test]
    fn renders_a_well_formed_digraph() {
        let tokens = Lexer::new("print(\"hi\")\n").run().unwrap();
        let ast = Parser::new(tokens).parse().unwrap();
        let dot = render(&ast);
        assert!(dot.starts_with("digraph astgraph {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains("print(hi)"));
    }

    #[test]
    fn every_node_gets_a_unique_id() {
        let tokens = Lexer::new("var a = 1\nvar b = 2\n").run().unwrap();
        let ast = Parser::new(tokens).parse().unwrap();
        let dot = render(&ast);
        assert!(dot.contains("node0"));
        assert!(dot.contains("node1"));
        assert!(dot.contains("node2"));
    }
}
