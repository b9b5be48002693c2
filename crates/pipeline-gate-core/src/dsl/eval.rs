// crates/pipeline-gate-core/src/dsl/eval.rs
// ============================================================================
// Module: Eval DSL Evaluator
// Description: Pure evaluation of expression trees against response documents.
// Purpose: Convert resolved response values into deterministic booleans.
// Dependencies: crate::document, crate::dsl::ast
// ============================================================================

//! ## Overview
//! Evaluation is pure and referentially transparent: the same expression and
//! document always yield the same boolean, with no side effects. Missing or
//! mistyped values fail closed: a comparison that cannot be made is `false`,
//! never an error. The single exception is the universal absence check:
//! `== null` is `true` when a path resolves to zero nodes.
//!
//! Multi-node resolutions follow the documented policy: scalar operators use
//! the first matched node in document order; `contains`/`not contains` test
//! membership across all matched nodes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::document::ResolvedNode;
use crate::document::ResponseDocument;
use crate::dsl::ast::CompareOp;
use crate::dsl::ast::Comparison;
use crate::dsl::ast::Expression;
use crate::dsl::ast::Literal;
use crate::dsl::ast::LogicalOp;

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates an expression tree against a response document.
#[must_use]
pub fn evaluate(expression: &Expression, document: &ResponseDocument) -> bool {
    match expression {
        Expression::Comparison(comparison) => evaluate_comparison(comparison, document),
        Expression::Logical {
            op,
            left,
            right,
        } => match op {
            LogicalOp::And => evaluate(left, document) && evaluate(right, document),
            LogicalOp::Or => evaluate(left, document) || evaluate(right, document),
        },
    }
}

/// Evaluates a single comparison against the document.
fn evaluate_comparison(comparison: &Comparison, document: &ResponseDocument) -> bool {
    let nodes = document.resolve(&comparison.path);
    if nodes.is_empty() {
        // Absent counts as null; every other comparison over nothing fails.
        return matches!(
            (comparison.operator, &comparison.literal),
            (CompareOp::Equals, Literal::Null)
        );
    }

    match comparison.operator {
        CompareOp::Equals => node_equals(&nodes[0], &comparison.literal),
        CompareOp::NotEquals => !node_equals(&nodes[0], &comparison.literal),
        CompareOp::GreaterThan
        | CompareOp::GreaterThanOrEqual
        | CompareOp::LessThan
        | CompareOp::LessThanOrEqual => {
            compare_ordering(comparison.operator, &nodes[0], &comparison.literal)
        }
        CompareOp::Contains => nodes.iter().any(|node| node_contains(node, &comparison.literal)),
        CompareOp::NotContains => {
            !nodes.iter().any(|node| node_contains(node, &comparison.literal))
        }
    }
}

/// Compares a resolved node against a literal within the literal's type.
#[allow(clippy::float_cmp, reason = "Literal equality is exact by definition.")]
fn node_equals(node: &ResolvedNode, literal: &Literal) -> bool {
    match literal {
        Literal::String(expected) => node.as_text().is_some_and(|text| text == *expected),
        Literal::Number(expected) => node.as_number().is_some_and(|value| value == *expected),
        Literal::Bool(expected) => node.as_bool() == Some(*expected),
        Literal::Null => node.is_null(),
    }
}

/// Applies a numeric ordering operator; mistyped sides fail closed.
fn compare_ordering(operator: CompareOp, node: &ResolvedNode, literal: &Literal) -> bool {
    let Literal::Number(expected) = literal else {
        return false;
    };
    let Some(actual) = node.as_number() else {
        return false;
    };
    match operator {
        CompareOp::GreaterThan => actual > *expected,
        CompareOp::GreaterThanOrEqual => actual >= *expected,
        CompareOp::LessThan => actual < *expected,
        CompareOp::LessThanOrEqual => actual <= *expected,
        _ => false,
    }
}

/// Tests whether one resolved node matches a `contains` literal.
///
/// Containers test element membership; scalar nodes test substring when the
/// literal is a string.
fn node_contains(node: &ResolvedNode, literal: &Literal) -> bool {
    if let Some(members) = node.members() {
        return members.iter().any(|member| node_equals(member, literal));
    }
    if let Literal::String(needle) = literal {
        return node.as_text().is_some_and(|text| text.contains(needle.as_str()));
    }
    false
}
