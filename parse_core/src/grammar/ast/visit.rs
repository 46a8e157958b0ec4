//! Read-only traversal over a finished tree

use crate::grammar::ast::nodes::{Node, NodeKind};
use crate::logging::codes;
use crate::utils::{Location, Position};

/// A child location that escapes its parent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{child_kind} at {child} is not enclosed by {parent_kind} at {parent}")]
pub struct EnclosureViolation {
    pub parent_kind: &'static str,
    pub parent: Location,
    pub child_kind: &'static str,
    pub child: Location,
}

impl EnclosureViolation {
    pub fn error_code(&self) -> crate::logging::Code {
        codes::ast::ENCLOSURE_VIOLATION
    }
}

impl Node {
    /// Direct children in source order
    pub fn children(&self) -> Vec<&Node> {
        let mut children: Vec<&Node> = Vec::new();
        match self.kind() {
            NodeKind::Program { body } => children.extend(body.iter()),
            NodeKind::Block { statements } => children.extend(statements.iter()),
            NodeKind::Let { initializer, .. } => children.extend(initializer.as_deref()),
            NodeKind::Function { params, body, .. } => {
                children.extend(params.iter());
                children.push(body);
            }
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                children.push(condition);
                children.push(then_branch);
                children.extend(else_branch.as_deref());
            }
            NodeKind::While { condition, body } => {
                children.push(condition);
                children.push(body);
            }
            NodeKind::Return { value } => children.extend(value.as_deref()),
            NodeKind::ExpressionStatement { expr } => children.push(expr),
            NodeKind::Assign { value, .. } => children.push(value),
            NodeKind::Binary { lhs, rhs, .. } => {
                children.push(lhs);
                children.push(rhs);
            }
            NodeKind::Unary { operand, .. } => children.push(operand),
            NodeKind::Call { callee, args } => {
                children.push(callee);
                children.extend(args.iter());
            }
            NodeKind::Group { inner } => children.push(inner),
            NodeKind::Identifier { .. }
            | NodeKind::Integer { .. }
            | NodeKind::Float { .. }
            | NodeKind::String { .. }
            | NodeKind::Boolean { .. }
            | NodeKind::Error => {}
        }
        children
    }

    /// Locations inside this node that are not themselves nodes: names,
    /// assignment targets and sequence locations
    fn inner_locations(&self) -> Vec<(&'static str, Location)> {
        match self.kind() {
            NodeKind::Program { body } => vec![("sequence", body.location())],
            NodeKind::Block { statements } => vec![("sequence", statements.location())],
            NodeKind::Let { name, .. } => vec![("name", name.location)],
            NodeKind::Function { name, params, .. } => {
                vec![("name", name.location), ("sequence", params.location())]
            }
            NodeKind::Assign { target, .. } => vec![("target", target.location)],
            NodeKind::Call { args, .. } => vec![("sequence", args.location())],
            _ => Vec::new(),
        }
    }
}

/// Pre-order traversal. The callback receives each node and its depth
/// (root is 0). Iterative, so deep trees do not grow the call stack.
pub fn walk<'a, F>(root: &'a Node, mut visit: F)
where
    F: FnMut(&'a Node, usize),
{
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        visit(node, depth);
        for child in node.children().into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }
}

pub fn node_count(root: &Node) -> usize {
    let mut count = 0;
    walk(root, |_, _| count += 1);
    count
}

/// Deepest node whose location contains `position`
pub fn find_innermost_at(root: &Node, position: Position) -> Option<&Node> {
    if !root.location().contains(position) {
        return None;
    }

    let mut current = root;
    'descend: loop {
        for child in current.children() {
            if child.location().contains(position) {
                current = child;
                continue 'descend;
            }
        }
        return Some(current);
    }
}

/// Check that every node encloses its children and inner locations.
/// Returns the first violation in pre-order.
pub fn validate_enclosure(root: &Node) -> Result<(), EnclosureViolation> {
    let mut violation = None;

    walk(root, |node, _| {
        if violation.is_some() {
            return;
        }
        let parent = node.location();

        for child in node.children() {
            if !parent.encloses(&child.location()) {
                violation = Some(EnclosureViolation {
                    parent_kind: node.kind().name(),
                    parent,
                    child_kind: child.kind().name(),
                    child: child.location(),
                });
                return;
            }
        }

        for (what, inner) in node.inner_locations() {
            if !parent.encloses(&inner) {
                violation = Some(EnclosureViolation {
                    parent_kind: node.kind().name(),
                    parent,
                    child_kind: what,
                    child: inner,
                });
                return;
            }
        }
    });

    match violation {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}
