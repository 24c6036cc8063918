//! FIRST and FOLLOW sets, computed incrementally to a fixed point.

use std::collections::BTreeSet;
use indexmap::IndexMap;
use log::{debug, trace};
use crate::bnf::*;
use crate::grammar::Grammar;
use crate::EPSILON;
use self::bitset::BitSet;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

mod bitset;

/// symbol -> set of symbols, in order of first occurrence in the grammar.
pub type SymbolSets = IndexMap<String, BTreeSet<String>>;

/// Both mappings have an entry for every symbol of the grammar. The empty
/// string stands for epsilon and `$` for the end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FirstFollow {
  pub first: SymbolSets,
  pub follow: SymbolSets,
}

impl FirstFollow {
  pub fn first_of(&self, sym: &str) -> Option<&BTreeSet<String>> {
    self.first.get(sym)
  }

  pub fn follow_of(&self, sym: &str) -> Option<&BTreeSet<String>> {
    self.follow.get(sym)
  }

  /// Whether `sym` derives the empty string.
  pub fn is_nullable(&self, sym: &str) -> bool {
    self.first_of(sym).map_or(false, |set| set.contains(EPSILON))
  }
}

pub fn compute(grammar: &Grammar) -> FirstFollow {
  Solver::new(grammar).solve()
}

pub struct Solver {
  bnf: Bnf,
  first: Vec<BitSet>,
  follow: Vec<BitSet>,
  passes: usize,
}

impl Solver {
  /// Classifies symbols, seeds FIRST of terminals and places `$` in FOLLOW of
  /// the start symbol.
  pub fn new(grammar: &Grammar) -> Self {
    let bnf = Bnf::from(grammar);
    let num_symbols = bnf.num_symbols();

    let first = (0..num_symbols)
      .map(|i| match bnf.kind(SymbolId(i as u32)) {
        SymbolKind::Term => BitSet::from_bit(num_symbols, i),
        SymbolKind::Nonterm | SymbolKind::Marker => BitSet::new(num_symbols),
      })
      .collect();
    let mut follow = vec![BitSet::new(num_symbols); num_symbols];

    let start = &mut follow[bnf.start.index()];
    start.clear();
    start.insert(END_MARKER_ID.index());

    debug!(
      "{} productions, {} symbols, start symbol {}",
      bnf.prods.len(),
      bnf.symbols().count(),
      bnf.name(bnf.start));

    Solver {
      bnf,
      first,
      follow,
      passes: 0,
    }
  }

  /// Applies every production once. Returns whether any set has changed.
  pub fn pass(&mut self) -> bool {
    let mut changed = false;
    for prod in &self.bnf.prods {
      changed |= apply_production(&self.bnf, &mut self.first, &mut self.follow, prod);
    }
    self.passes += 1;
    trace!("pass {}: changed = {}", self.passes, changed);
    changed
  }

  /// Number of passes run so far.
  pub fn passes(&self) -> usize {
    self.passes
  }

  /// Iterates until a pass adds nothing.
  pub fn solve(mut self) -> FirstFollow {
    while self.pass() {}
    debug!("converged after {} passes", self.passes);
    self.sets()
  }

  /// Snapshot of the sets computed so far.
  pub fn sets(&self) -> FirstFollow {
    FirstFollow {
      first: self.to_symbol_sets(&self.first),
      follow: self.to_symbol_sets(&self.follow),
    }
  }

  fn to_symbol_sets(&self, sets: &[BitSet]) -> SymbolSets {
    self.bnf.symbols()
      .map(|sym| {
        let set = sets[sym.index()].iter()
          .map(|i| self.bnf.name(SymbolId(i as u32)).to_owned())
          .collect();
        (self.bnf.name(sym).to_owned(), set)
      })
      .collect()
  }
}

fn apply_production(
  bnf: &Bnf,
  first: &mut [BitSet],
  follow: &mut [BitSet],
  prod: &Production,
) -> bool {
  let nt = prod.nonterm.index();
  let eps = EPSILON_ID.index();

  if !bnf.is_nonterm(prod.nonterm) {
    return first[nt].insert(nt);
  }

  if prod.symbols.is_empty() {
    return first[nt].insert(eps);
  }

  let mut changed = false;
  // every symbol before the current one is nullable
  let mut nullable_prefix = true;
  let last = prod.symbols.len() - 1;

  for (i, &sym) in prod.symbols.iter().enumerate() {
    let sym_first = first[sym.index()].clone();

    if nullable_prefix {
      changed |= first[nt].union_with_except(&sym_first, eps);
      nullable_prefix = sym_first.contains(eps);
    }

    if i > 0 {
      let prev = prod.symbols[i - 1];
      if bnf.is_nonterm(prev) {
        changed |= follow[prev.index()].union_with_except(&sym_first, eps);
      }
    }

    if i == last {
      changed |= propagate_follow(bnf, first, follow, prod);
    }
  }

  if nullable_prefix {
    changed |= first[nt].insert(eps);
  }

  changed
}

/// Adds FOLLOW of the production's symbol to each nonterminal of the
/// trailing run whose remainder is nullable.
fn propagate_follow(
  bnf: &Bnf,
  first: &[BitSet],
  follow: &mut [BitSet],
  prod: &Production,
) -> bool {
  let nt_follow = follow[prod.nonterm.index()].clone();
  let mut changed = false;

  for &sym in prod.symbols.iter().rev() {
    if !bnf.is_nonterm(sym) {
      break;
    }
    changed |= follow[sym.index()].union_with(&nt_follow);
    if !first[sym.index()].contains(EPSILON_ID.index()) {
      break;
    }
  }

  changed
}
