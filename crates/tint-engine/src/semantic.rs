//! Semantic keys and the most-specific-first fallback resolver.
//!
//! Users attach colors to semantic codes written as
//!
//! ```text
//! variable                      bare type
//! variable:readonly,static      type + exact modifier set (any order)
//! variable:*readonly            type + "has this modifier"
//! variable:*readonly,static     one "has this modifier" rule per listed modifier
//! ```
//!
//! Each code normalizes to one or more [`SemanticKey`]s. A span with type `T` and
//! modifiers `m1..mn` is looked up in this order, first hit wins:
//!
//! 1. `T:sorted(m1..mn)`
//! 2. `T:*m1`, `T:*m2`, ... in the span's own modifier order
//! 3. `T`
//! 4. [`SemanticKey::Default`]: always present, so resolution never fails.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// `type`, `type:m1,m2`, `type:*m` or `type:*m1,m2`.
static SEMANTIC_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?::(\*?\w+(?:\s*,\s*\w+)*))?$").unwrap_or_else(|e| {
        unreachable!("semantic code pattern is a literal and compiles: {e}")
    })
});

// ---------------------------------------------------------------------------
// SemanticKey
// ---------------------------------------------------------------------------

/// Canonical identity of a semantic color rule.
///
/// `Default` is distinct from every named key, including one literally
/// spelled `"default"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemanticKey {
    Default,
    Named(String),
}

/// A semantic code that does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSemanticCode(pub String);

impl fmt::Display for InvalidSemanticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid semantic code {:?} (expected `type`, `type:mod1,mod2` or `type:*mod`)",
            self.0
        )
    }
}

impl SemanticKey {
    /// Key for a type and its full modifier set. Order and duplicates in
    /// `modifiers` do not matter; no modifiers gives the bare key.
    #[must_use]
    pub fn exact<S: AsRef<str>>(semantic_type: &str, modifiers: &[S]) -> Self {
        let mut mods: Vec<&str> = modifiers.iter().map(AsRef::as_ref).collect();
        mods.sort_unstable();
        mods.dedup();
        if mods.is_empty() {
            Self::bare(semantic_type)
        } else {
            Self::Named(format!("{semantic_type}:{}", mods.join(",")))
        }
    }

    /// Key matching any span of `semantic_type` carrying `modifier`.
    #[must_use]
    pub fn wildcard(semantic_type: &str, modifier: &str) -> Self {
        Self::Named(format!("{semantic_type}:*{modifier}"))
    }

    /// Key for the type alone.
    #[must_use]
    pub fn bare(semantic_type: &str) -> Self {
        Self::Named(semantic_type.to_owned())
    }

    /// Parse a user-written semantic code into its canonical keys.
    ///
    /// Bare and exact codes give one key. A wildcard code gives one
    /// wildcard key per listed modifier, deduplicated, in written order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSemanticCode`] when `code` does not match the grammar.
    pub fn parse(code: &str) -> Result<Vec<Self>, InvalidSemanticCode> {
        let invalid = || InvalidSemanticCode(code.to_owned());
        let caps = SEMANTIC_CODE.captures(code.trim()).ok_or_else(invalid)?;
        let semantic_type = caps.get(1).ok_or_else(invalid)?.as_str();
        let Some(mods) = caps.get(2) else {
            return Ok(vec![Self::bare(semantic_type)]);
        };
        let mods = mods.as_str();
        let Some(wild) = mods.strip_prefix('*') else {
            let list: Vec<&str> = mods.split(',').map(str::trim).collect();
            return Ok(vec![Self::exact(semantic_type, &list)]);
        };
        let mut keys: Vec<Self> = Vec::new();
        for modifier in wild.split(',').map(str::trim) {
            let key = Self::wildcard(semantic_type, modifier);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    /// Whether this is the terminal fallback key.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for SemanticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("<default>"),
            Self::Named(s) => f.write_str(s),
        }
    }
}

/// The keys tried for a span, most specific first, excluding the default.
#[must_use]
pub fn fallback_chain<S: AsRef<str>>(semantic_type: &str, modifiers: &[S]) -> Vec<SemanticKey> {
    let mut chain = Vec::with_capacity(modifiers.len() + 2);
    if !modifiers.is_empty() {
        chain.push(SemanticKey::exact(semantic_type, modifiers));
        for m in modifiers {
            chain.push(SemanticKey::wildcard(semantic_type, m.as_ref()));
        }
    }
    chain.push(SemanticKey::bare(semantic_type));
    chain
}

/// Resolve a span's type and modifiers against `table`, falling back to
/// `(SemanticKey::Default, default)`.
pub fn resolve_key<'t, V, S: AsRef<str>>(
    semantic_type: &str,
    modifiers: &[S],
    table: &'t BTreeMap<SemanticKey, V>,
    default: &'t V,
) -> (SemanticKey, &'t V) {
    for key in fallback_chain(semantic_type, modifiers) {
        if let Some(value) = table.get(&key) {
            return (key, value);
        }
    }
    (SemanticKey::Default, default)
}

// ---------------------------------------------------------------------------
// SemanticTable
// ---------------------------------------------------------------------------

/// Values keyed by semantic key, with a mandatory default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticTable<V> {
    entries: BTreeMap<SemanticKey, V>,
    default: V,
}

impl<V> SemanticTable<V> {
    /// A table holding only the default value.
    #[must_use]
    pub const fn new(default: V) -> Self {
        Self {
            entries: BTreeMap::new(),
            default,
        }
    }

    /// Insert or replace a value. Inserting under [`SemanticKey::Default`]
    /// replaces the default and returns the old one.
    pub fn insert(&mut self, key: SemanticKey, value: V) -> Option<V> {
        if key.is_default() {
            Some(std::mem::replace(&mut self.default, value))
        } else {
            self.entries.insert(key, value)
        }
    }

    /// Exact lookup, no fallback.
    #[must_use]
    pub fn get(&self, key: &SemanticKey) -> Option<&V> {
        if key.is_default() {
            Some(&self.default)
        } else {
            self.entries.get(key)
        }
    }

    /// Most specific value for a span's type and modifiers.
    pub fn resolve<S: AsRef<str>>(&self, semantic_type: &str, modifiers: &[S]) -> (SemanticKey, &V) {
        resolve_key(semantic_type, modifiers, &self.entries, &self.default)
    }

    /// The fallback value.
    #[must_use]
    pub const fn default_value(&self) -> &V {
        &self.default
    }

    /// Named entries plus the default (always counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    /// Never empty: the default always exists.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Every entry in key order, default first.
    pub fn iter(&self) -> impl Iterator<Item = (SemanticKey, &V)> {
        std::iter::once((SemanticKey::Default, &self.default))
            .chain(self.entries.iter().map(|(k, v)| (k.clone(), v)))
    }

    /// Build a new table by transforming every value, default first.
    pub fn map<W, F>(&self, mut f: F) -> SemanticTable<W>
    where
        F: FnMut(&SemanticKey, &V) -> W,
    {
        let default = f(&SemanticKey::Default, &self.default);
        let entries = self.entries.iter().map(|(k, v)| (k.clone(), f(k, v))).collect();
        SemanticTable { entries, default }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
