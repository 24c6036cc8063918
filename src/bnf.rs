use indexmap::IndexSet;
use crate::grammar::Grammar;
use crate::{END_MARKER, EPSILON};

pub(crate) struct Bnf {
  /// symbol id -> name
  pub(crate) names: IndexSet<String>,
  /// symbol id -> category
  pub(crate) kinds: Vec<SymbolKind>,
  pub(crate) start: SymbolId,
  pub(crate) prods: Vec<Production>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum SymbolKind {
  /// The epsilon or end-of-input marker, unless the grammar also uses it.
  Marker,
  Term,
  Nonterm,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct SymbolId(pub(crate) u32);

pub(crate) const EPSILON_ID: SymbolId = SymbolId(0);
pub(crate) const END_MARKER_ID: SymbolId = SymbolId(1);

#[derive(Clone)]
pub(crate) struct Production {
  pub(crate) nonterm: SymbolId,
  pub(crate) symbols: Vec<SymbolId>,
}

impl SymbolId {
  pub(crate) fn index(self) -> usize {
    self.0 as usize
  }
}

impl Bnf {
  pub(crate) fn kind(&self, sym: SymbolId) -> SymbolKind {
    self.kinds[sym.index()]
  }

  pub(crate) fn is_nonterm(&self, sym: SymbolId) -> bool {
    self.kind(sym) == SymbolKind::Nonterm
  }

  pub(crate) fn name(&self, sym: SymbolId) -> &str {
    &self.names[sym.index()]
  }

  pub(crate) fn num_symbols(&self) -> usize {
    self.names.len()
  }

  /// Symbols that occur in the grammar, in order of first occurrence.
  pub(crate) fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
    self.kinds.iter()
      .enumerate()
      .filter(|&(_, &kind)| kind != SymbolKind::Marker)
      .map(|(i, _)| SymbolId(i as u32))
  }
}

impl From<&Grammar> for Bnf {
  fn from(grammar: &Grammar) -> Bnf {
    let mut names = IndexSet::new();
    names.insert(EPSILON.to_owned());
    names.insert(END_MARKER.to_owned());
    let mut kinds = vec![SymbolKind::Marker; 2];

    let mut intern = |name: &str| -> SymbolId {
      let kind = if grammar.is_nonterminal(name) {
        SymbolKind::Nonterm
      } else {
        SymbolKind::Term
      };
      let (ix, _) = names.insert_full(name.to_owned());
      if ix == kinds.len() {
        kinds.push(kind);
      } else {
        kinds[ix] = kind;
      }
      SymbolId(ix as u32)
    };

    let prods = grammar.productions().iter()
      .map(|prod| {
        let nonterm = intern(&prod.symbol);
        let symbols = prod.derivation.iter()
          .map(|sym| intern(sym))
          .collect();
        Production {
          nonterm,
          symbols,
        }
      })
      .collect::<Vec<_>>();

    Bnf {
      names,
      kinds,
      start: prods[0].nonterm,
      prods,
    }
  }
}
