pub mod grammar;
pub mod sets;
mod bnf;

pub use grammar::{Error, Grammar, Production};
pub use sets::{compute, FirstFollow, Solver};

/// Member of a FIRST set for symbols that derive the empty string.
pub const EPSILON: &str = "";

/// Member of the start symbol's FOLLOW set.
pub const END_MARKER: &str = "$";

/// Parses `text` and computes its FIRST and FOLLOW sets.
pub fn first_follow(text: &str) -> Result<FirstFollow, Error> {
  let grammar = Grammar::parse(text)?;
  Ok(compute(&grammar))
}
