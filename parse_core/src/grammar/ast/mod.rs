//! Abstract syntax tree

pub mod nodes;
pub mod sequence;
pub mod visit;

pub use nodes::{make_node, BinaryOp, Node, NodeKind, UnaryOp};
pub use sequence::{make_sequence, NodeSequence};
pub use visit::{find_innermost_at, node_count, validate_enclosure, walk, EnclosureViolation};

use crate::logging::codes;

/// Compact JSON for a tree
pub fn to_json(root: &Node) -> Result<String, serde_json::Error> {
    serde_json::to_string(root).inspect_err(|e| {
        crate::log_error!(codes::ast::SERIALIZATION_FAILURE, "AST serialization failed",
            "error" => e);
    })
}

pub fn to_json_pretty(root: &Node) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(root).inspect_err(|e| {
        crate::log_error!(codes::ast::SERIALIZATION_FAILURE, "AST serialization failed",
            "error" => e);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::point;

    #[test]
    fn json_export_round_trips_through_value() {
        let root = make_node(
            NodeKind::Program {
                body: make_sequence(Vec::new(), point(1, 1)),
            },
            point(1, 1),
        );

        let compact = to_json(&root).unwrap();
        let pretty = to_json_pretty(&root).unwrap();
        let a: serde_json::Value = serde_json::from_str(&compact).unwrap();
        let b: serde_json::Value = serde_json::from_str(&pretty).unwrap();

        assert_eq!(a, b);
        assert_eq!(a["kind"], "Program");
        assert_eq!(a["body"]["items"], serde_json::json!([]));
    }
}
