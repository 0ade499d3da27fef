//! DOT emission for rooted diagrams.
//!
//! Internal nodes are ovals, the leaf a square labeled `1`. Low edges are
//! dotted, high edges solid; an `odot` arrowhead marks a complement edge.
//! Only low edges and the root's incoming edge can carry one. The walk
//! marks visited nodes and clears every mark before returning.

use std::fmt::Write as _;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// Render the diagram rooted at `node` as a DOT digraph, with `name`
    /// as the label of the root pointer.
    pub fn to_dot(&mut self, node: Ref, name: &str) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "  node [shape=plaintext];")?;
        writeln!(dot, "  terminal [label=\"1\", shape=square];")?;
        writeln!(dot, "  {{ rank=source; \"{}\"; }}", name)?;
        writeln!(dot, "  node [shape=oval];")?;
        writeln!(
            dot,
            "  \"{}\" -> \"{}\"{}",
            name,
            self.dot_label(node),
            if node.is_complemented() { " [arrowhead=odot];" } else { ";" }
        )?;
        self.emit_recur(node, &mut dot)?;
        self.unmark_recur(node.index());
        writeln!(dot, "  {{ rank=same; \"terminal\"; }}")?;
        writeln!(dot, "}}")?;
        Ok(dot)
    }

    fn dot_label(&self, node: Ref) -> String {
        if self.is_leaf(node) {
            "terminal".to_string()
        } else {
            format!("n{}", node.index())
        }
    }

    fn emit_recur(&mut self, node: Ref, dot: &mut String) -> std::fmt::Result {
        if self.node(node.index()).mark {
            return Ok(());
        }
        self.table.node_mut(node.index()).mark = true;
        if self.is_leaf(node) {
            return Ok(());
        }

        let low = self.low(node);
        let high = self.high(node);
        writeln!(dot, "  {{ rank=same; \"{}\"; }}", self.dot_label(node))?;
        writeln!(
            dot,
            "  \"{}\" -> \"{}\" [style=dotted]{}",
            self.dot_label(node),
            self.dot_label(low),
            if low.is_complemented() { " [arrowhead=odot]" } else { ";" }
        )?;
        writeln!(dot, "  \"{}\" -> \"{}\";", self.dot_label(node), self.dot_label(high))?;
        self.emit_recur(low, dot)?;
        self.emit_recur(high, dot)
    }
}
