//! Deterministic tree rendering via `ptree::TreeItem`, grounded on the
//! teacher's `impl TreeItem for ASTNode<TNode>` (spec §4.3 "Pretty-print").

use super::Node;
use ptree::Style;
use std::borrow::Cow;
use std::io::Write;

impl ptree::TreeItem for Node {
    type Child = Node;

    fn write_self<W: Write>(&self, f: &mut W, _style: &Style) -> std::io::Result<()> {
        match self.name() {
            Some(name) => write!(f, "{} \"{}\" @ {}", self.kind_name(), name, self.location),
            None => write!(f, "{} @ {}", self.kind_name(), self.location),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        // Resolves to the inherent `Node::children`, not this trait method;
        // inherent methods take priority over trait methods in Rust.
        Cow::Owned(self.children().into_iter().cloned().collect())
    }
}

impl Node {
    /// Print the tree to stdout using `ptree`'s terminal-aware style.
    pub fn print(&self) -> std::io::Result<()> {
        ptree::print_tree(self)
    }
}

/// Render a node and its descendants with `ptree`'s default ASCII style,
/// into a `String` rather than a terminal, so output is stable under
/// test regardless of colour/width detection.
pub fn render(node: &Node) -> String {
    let mut buf = Vec::new();
    let config = ptree::PrintConfig::default();
    ptree::write_tree_with(node, &mut buf, &config).expect("writing to an in-memory buffer cannot fail");
    String::from_utf8(buf).expect("ptree output is always valid UTF-8")
}
