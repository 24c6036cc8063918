use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use indexmap::IndexMap;
use log::trace;
use thiserror::Error;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

const ARROWS: &[&str] = &["->", "→"];
const ALTERNATION: &[char] = &['|', '∣'];
const EPSILONS: &[char] = &['ε', 'ϵ'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("invalid rule `{0}`")]
  InvalidRule(String),
  #[error("empty grammar")]
  EmptyGrammar,
}

/// `symbol -> derivation`. An empty derivation derives the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Production {
  pub symbol: String,
  pub derivation: Vec<String>,
}

impl Production {
  pub fn new<S: Into<String>>(
    symbol: impl Into<String>,
    derivation: impl IntoIterator<Item = S>,
  ) -> Self {
    Production {
      symbol: symbol.into(),
      derivation: derivation.into_iter().map(Into::into).collect(),
    }
  }
}

impl Display for Production {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} ->", self.symbol)?;
    if self.derivation.is_empty() {
      return write!(f, " ε");
    }
    for sym in &self.derivation {
      write!(f, " {}", sym)?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone)]
pub struct Grammar {
  /// non-empty, in declaration order
  prods: Vec<Production>,
  /// nonterminal -> derivations, in declaration order
  alternatives: IndexMap<String, Vec<Vec<String>>>,
}

impl Grammar {
  /// Parses rules of the form `A -> b C | d`, one per line or separated by
  /// `;`.
  pub fn parse(text: &str) -> Result<Self, Error> {
    let mut prods = vec![];

    for line in text.split(&[';', '\n'][..]) {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      parse_rule(line, &mut prods)?;
    }

    Self::from_productions(prods)
  }

  /// Builds a grammar from productions. The first production's symbol is the
  /// start symbol.
  pub fn from_productions(
    prods: impl IntoIterator<Item = Production>,
  ) -> Result<Self, Error> {
    let mut alternatives = IndexMap::<String, Vec<Vec<String>>>::new();

    let prods = prods.into_iter()
      .map(|mut prod| {
        if prod.symbol.is_empty() || prod.symbol.contains(char::is_whitespace) {
          return Err(Error::InvalidRule(prod.to_string()));
        }
        prod.derivation.retain(|sym| !is_epsilon(sym));
        alternatives.entry(prod.symbol.clone())
          .or_default()
          .push(prod.derivation.clone());
        Ok(prod)
      })
      .collect::<Result<Vec<_>, _>>()?;

    if prods.is_empty() {
      return Err(Error::EmptyGrammar);
    }

    Ok(Grammar {
      prods,
      alternatives,
    })
  }

  pub fn start_symbol(&self) -> &str {
    &self.prods[0].symbol
  }

  pub fn productions(&self) -> &[Production] {
    &self.prods
  }

  /// Derivations of `nonterm`, or `None` if it is not a nonterminal.
  pub fn alternatives(&self, nonterm: &str) -> Option<&[Vec<String>]> {
    self.alternatives.get(nonterm).map(Vec::as_slice)
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
    self.alternatives.keys().map(String::as_str)
  }

  /// Symbols without productions, including undeclared ones, are terminals.
  pub fn is_nonterminal(&self, sym: &str) -> bool {
    self.alternatives.contains_key(sym)
  }
}

impl FromStr for Grammar {
  type Err = Error;

  fn from_str(text: &str) -> Result<Self, Error> {
    Grammar::parse(text)
  }
}

fn parse_rule(line: &str, prods: &mut Vec<Production>) -> Result<(), Error> {
  let (lhs, rhs) = split_arrow(line)
    .ok_or_else(|| Error::InvalidRule(line.to_owned()))?;

  let lhs = lhs.trim();
  if lhs.is_empty() || lhs.contains(char::is_whitespace) {
    return Err(Error::InvalidRule(line.to_owned()));
  }

  let rhs = rhs.replace(EPSILONS, "");
  for alt in rhs.trim().split(ALTERNATION) {
    let prod = Production::new(lhs, alt.split_whitespace());
    trace!("parsed {}", prod);
    prods.push(prod);
  }

  Ok(())
}

/// Splits at the leftmost arrow.
fn split_arrow(line: &str) -> Option<(&str, &str)> {
  ARROWS.iter()
    .filter_map(|arrow| line.find(arrow).map(|i| (i, arrow.len())))
    .min_by_key(|&(i, _)| i)
    .map(|(i, len)| (&line[..i], &line[i + len..]))
}

fn is_epsilon(sym: &str) -> bool {
  sym.chars().all(|c| EPSILONS.contains(&c))
}
