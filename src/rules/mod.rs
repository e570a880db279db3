//! Collection rule compilation
//!
//! Turns user-authored merchandising rules (`attribute`, `operator`, `value`)
//! into a conjunctive query document for the catalog store, and evaluates that
//! query in memory for collection previews.

mod coerce;
mod compiler;
mod query;
mod rule;

#[cfg(test)]
mod property_tests;

pub use compiler::*;
pub use query::*;
pub use rule::*;
