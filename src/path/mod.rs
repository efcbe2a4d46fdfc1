//! Path matching
//!
//! The XPath-like subset scoping attached handlers: `/` child steps,
//! attribute comparisons in brackets, and a trailing `@name`/`@*`
//! attribute restriction. Compiled paths live in a shared matcher tree
//! traversed leaf-to-root at parse time.

mod compiler;
mod step;
mod tree;

pub use compiler::compile;
pub use step::{Axis, CompareOp, Predicate, PredicateValue, StepMatcher};
pub use tree::{Hook, HookKind, MatcherNode};
