//! Rule matching against AST nodes.
//!
//! Pure lookups: a node is matched against the configured rules in
//! declaration order by its source file path, with an optional transitive
//! base-class predicate. Failures degrade to "no match"; nothing here has
//! side effects.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::ast::{Node, NodeKind};
use crate::config::Rule;

/// Index of class declarations by name, built once per translation unit.
///
/// Base specifiers name their base class but do not embed its declaration;
/// the index lets the transitive base walk follow each base's own base
/// specifiers. The first declaration of a name wins.
#[derive(Debug)]
pub struct DeclIndex<'a> {
    classes: HashMap<&'a str, &'a Node>,
}

impl<'a> DeclIndex<'a> {
    /// Walks the tree and indexes every class declaration.
    #[must_use]
    pub fn build(root: &'a Node) -> Self {
        let mut classes = HashMap::new();
        collect_classes(root, &mut classes);
        Self { classes }
    }

    /// Looks up a class declaration by name.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&'a Node> {
        self.classes.get(name).copied()
    }
}

fn collect_classes<'a>(node: &'a Node, classes: &mut HashMap<&'a str, &'a Node>) {
    if node.kind == NodeKind::Class && !node.spelling.is_empty() {
        classes.entry(node.spelling.as_str()).or_insert(node);
    }
    for child in &node.children {
        collect_classes(child, classes);
    }
}

/// Finds the first rule governing a node, if any.
///
/// Iterates rules in declaration order and tests the node's file path
/// against every glob of each rule. On a pattern hit, a rule with a required
/// base class applies only if the node derives (directly or transitively)
/// from that base; otherwise matching continues with later rules.
///
/// Nodes without a file location (synthesized nodes) never match.
#[must_use]
pub fn match_rule<'r>(
    rules: &'r [Rule],
    node: &Node,
    index: &DeclIndex<'_>,
) -> Option<(usize, &'r Rule)> {
    let file = node.file.as_deref()?;

    for (i, rule) in rules.iter().enumerate() {
        if !rule.files.iter().any(|p| p.matches_path(file)) {
            continue;
        }
        match &rule.base {
            None => return Some((i, rule)),
            Some(base) => {
                let mut visited = HashSet::new();
                if derives_from(node, base, index, &mut visited) {
                    return Some((i, rule));
                }
            }
        }
    }

    None
}

/// Whether `node` derives from `base`, following each base specifier's own
/// declaration through the index. Tolerates unindexed bases (the walk stops
/// there) and cyclic hierarchies (visited set).
fn derives_from(
    node: &Node,
    base: &str,
    index: &DeclIndex<'_>,
    visited: &mut HashSet<String>,
) -> bool {
    for child in &node.children {
        if child.kind != NodeKind::Base {
            continue;
        }
        if child.spelling == base {
            return true;
        }
        if visited.insert(child.spelling.clone()) {
            if let Some(decl) = index.class(&child.spelling) {
                if derives_from(decl, base, index, visited) {
                    return true;
                }
            }
        }
    }
    false
}
