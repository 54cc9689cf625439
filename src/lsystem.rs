//! Context-free L-System rewriting.
//!
//! Rules are single-symbol productions written as a comma-separated list of
//! `Symbol:Replacement` pairs, e.g. `"X:F[+X]F[-X]+X, F:FF"`. Expansion applies
//! every rule simultaneously per round; symbols without a rule are copied.
//!
//! [`expand`] performs no bound checking. Output length grows geometrically
//! with the iteration count, so callers clamp iterations first (see
//! [`crate::params::MAX_ITERATIONS`]).

use bevy::platform::collections::HashMap;

use crate::error::PlantGenError;

/// A set of single-symbol productions. Keys are unique.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<char, String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated `Symbol:Replacement` list.
    ///
    /// Both sides are trimmed and blank segments (a trailing comma) are
    /// skipped. The replacement may be empty, which erases the symbol.
    pub fn parse(input: &str) -> Result<Self, PlantGenError> {
        let mut set = Self::new();

        for pair in input.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            let Some((symbol, replacement)) = pair.split_once(':') else {
                return Err(PlantGenError::MalformedRule(pair.to_string()));
            };

            let symbol = symbol.trim();
            let mut chars = symbol.chars();
            let (Some(key), None) = (chars.next(), chars.next()) else {
                return Err(PlantGenError::InvalidSymbol(symbol.to_string()));
            };

            set.insert(key, replacement.trim())?;
        }

        if set.is_empty() {
            return Err(PlantGenError::EmptyRules);
        }
        Ok(set)
    }

    /// Adds a production, rejecting a second rule for the same symbol.
    pub fn insert(&mut self, symbol: char, replacement: &str) -> Result<(), PlantGenError> {
        if self.rules.contains_key(&symbol) {
            return Err(PlantGenError::DuplicateRule(symbol));
        }
        self.rules.insert(symbol, replacement.to_string());
        Ok(())
    }

    pub fn get(&self, symbol: char) -> Option<&str> {
        self.rules.get(&symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Applies one round of simultaneous substitution.
pub fn rewrite(current: &str, rules: &RuleSet) -> String {
    let mut next = String::with_capacity(current.len() * 2);
    for symbol in current.chars() {
        match rules.get(symbol) {
            Some(replacement) => next.push_str(replacement),
            None => next.push(symbol),
        }
    }
    next
}

/// Rewrites `axiom` `iterations` times. Zero iterations returns the axiom.
pub fn expand(axiom: &str, rules: &RuleSet, iterations: u32) -> String {
    (0..iterations).fold(axiom.to_string(), |current, _| rewrite(&current, rules))
}
