//! Global-existence policy for unresolved identifiers
//!
//! The analyzer never probes the host itself. The embedding supplies a
//! [`GlobalResolver`] that answers whether a free identifier names something
//! defined in the host's global scope.

use rustc_hash::FxHashSet;

pub trait GlobalResolver {
    fn is_global_defined(&self, name: &str) -> bool;
}

/// Reports nothing as defined
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGlobals;

impl GlobalResolver for NoGlobals {
    fn is_global_defined(&self, _name: &str) -> bool {
        false
    }
}

/// A fixed set of defined names
#[derive(Debug, Clone, Default)]
pub struct KnownGlobals {
    names: FxHashSet<String>,
}

impl KnownGlobals {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl GlobalResolver for KnownGlobals {
    fn is_global_defined(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl<F> GlobalResolver for F
where
    F: Fn(&str) -> bool,
{
    fn is_global_defined(&self, name: &str) -> bool {
        self(name)
    }
}
