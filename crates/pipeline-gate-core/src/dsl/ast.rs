// crates/pipeline-gate-core/src/dsl/ast.rs
// ============================================================================
// Module: Eval DSL Syntax Tree
// Description: Immutable expression tree produced by the Eval DSL parser.
// Purpose: Represent path comparisons and boolean composition for evaluation.
// Dependencies: crate::document, serde
// ============================================================================

//! ## Overview
//! The Eval DSL syntax tree is a small, immutable expression form: every leaf
//! is a typed comparison between a response path and a literal, every internal
//! node is a boolean combinator. Parenthetical grouping is resolved during
//! parsing and not retained in the tree.
//!
//! Security posture: expression sources are operator-supplied configuration;
//! they are validated structurally before any evaluation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::document::DocumentFormat;

// ============================================================================
// SECTION: Path Expressions
// ============================================================================

/// Path lookup bound to a document format by its wrapper function.
///
/// # Invariants
/// - `format` is fixed by the `jsonpath(...)` / `xpath(...)` wrapper that
///   surrounded `raw` in the source text.
/// - `raw` was validated against the format's path engine at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathExpression {
    /// Document format the path addresses.
    pub format: DocumentFormat,
    /// Path text as written inside the wrapper.
    pub raw: String,
}

// ============================================================================
// SECTION: Literals
// ============================================================================

/// Typed literal on the right-hand side of a comparison.
///
/// # Invariants
/// - The variant is determined lexically: quoted text is `String`,
///   `true`/`false` is `Bool`, `null` is `Null`, anything else parsed as a
///   signed decimal number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// Quoted string literal.
    String(String),
    /// Signed decimal number literal.
    Number(f64),
    /// Boolean literal.
    Bool(bool),
    /// Null literal.
    Null,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "'{value}'"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Null => write!(f, "null"),
        }
    }
}

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Comparison operator between a resolved path and a literal.
///
/// # Invariants
/// - Variants are stable for serialization and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Typed equality (`==`).
    Equals,
    /// Typed inequality (`!=`).
    NotEquals,
    /// Numeric greater-than (`>`).
    GreaterThan,
    /// Numeric greater-than-or-equal (`>=`).
    GreaterThanOrEqual,
    /// Numeric less-than (`<`).
    LessThan,
    /// Numeric less-than-or-equal (`<=`).
    LessThanOrEqual,
    /// Substring or membership test (`contains`).
    Contains,
    /// Negated substring or membership test (`not contains`).
    NotContains,
}

impl CompareOp {
    /// Returns the operator as written in the DSL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Contains => "contains",
            Self::NotContains => "not contains",
        }
    }

    /// Returns true for the numeric ordering operators.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterThanOrEqual | Self::LessThan | Self::LessThanOrEqual
        )
    }
}

/// Boolean combinator joining two sub-expressions.
///
/// # Invariants
/// - Variants are stable for serialization and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    /// Both sides must hold.
    And,
    /// Either side must hold.
    Or,
}

// ============================================================================
// SECTION: Expressions
// ============================================================================

/// Leaf comparison between a path lookup and a typed literal.
///
/// # Invariants
/// - `path` and `literal` were validated together at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Path lookup on the left-hand side.
    pub path: PathExpression,
    /// Comparison operator.
    pub operator: CompareOp,
    /// Literal on the right-hand side.
    pub literal: Literal,
}

/// Parsed Eval DSL expression tree.
///
/// # Invariants
/// - Every leaf is a [`Comparison`]; every internal node is `Logical`.
/// - The tree is immutable after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    /// Leaf comparison node.
    Comparison(Comparison),
    /// Boolean combination of two sub-expressions.
    Logical {
        /// Combinator applied to both sides.
        op: LogicalOp,
        /// Left operand, evaluated first.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
}
