//! Centralized limits and thresholds for static reflection.
//!
//! Every recursive algorithm in refract (expression parsing, constant
//! evaluation, inheritance walks) carries an explicit depth bound so that
//! adversarial or simply very deep input fails with an error instead of
//! exhausting the call stack. Cycles are detected separately with
//! in-progress markers; these limits only guard against depth.

// =============================================================================
// Recursion Depth Limits (Parser / Resolver / Reflection)
// =============================================================================

/// Maximum nesting depth for expressions accepted by the parser.
///
/// Each nested parenthesis, unary operator or binary operand adds a frame
/// to the recursive-descent parser. At this depth the parser reports a
/// diagnostic and stops descending.
///
/// # PHP example
///
/// ```php
/// const X = ((((((((((((((1 + 2) + 3) /* ... 256 levels ... */))))))))))));
/// ```
pub const MAX_PARSER_DEPTH: u32 = 256;

/// Maximum depth for constant-expression evaluation.
///
/// Counts nested sub-expressions *and* cross-constant hops
/// (`A::X` referencing `B::Y` referencing ...). Exceeding it fails the
/// evaluation instead of overflowing the stack.
pub const MAX_CONST_EXPR_DEPTH: u32 = 256;

/// Maximum number of constants being resolved at once.
///
/// Every hop from one constant to the next (`C2 = self::C1 + 1`) costs
/// several large frames (resolution, evaluation, member lookup), far more
/// than a nested sub-expression. A 2 MiB thread stack (the default for
/// spawned threads) holds about 120 hops in debug builds.
pub const MAX_CONSTANT_CHAIN: u32 = 64;

/// Maximum length of a parent chain walked by inheritance-aware lookups.
///
/// Cycles are reported as `InheritanceCycle` long before this bound is
/// reached; the bound protects against pathological but acyclic chains.
pub const MAX_INHERITANCE_DEPTH: u32 = 256;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Largest repeat count accepted by the `str_repeat` built-in during
/// constant evaluation.
pub const MAX_STR_REPEAT_LEN: usize = 1 << 20;

/// Number of significant digits PHP uses when converting a float to a
/// string (`precision` ini default).
pub const FLOAT_STRING_PRECISION: usize = 14;
