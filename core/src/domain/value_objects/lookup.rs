//! Three-way result of a point lookup.

/// Outcome of looking a record up by one of its keys.
///
/// A miss and an empty-input short-circuit are distinct outcomes, and neither
/// is an error; storage failures travel separately as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// A live record matched
    Found(T),
    /// Storage was queried and nothing matched
    NotFound,
    /// The key was empty, so storage was not queried
    Skipped,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Lookup::Skipped)
    }

    /// Collapse misses and skips into `None`
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Skipped => None,
        }
    }

    pub fn as_ref(&self) -> Lookup<&T> {
        match self {
            Lookup::Found(value) => Lookup::Found(value),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Skipped => Lookup::Skipped,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Skipped => Lookup::Skipped,
        }
    }
}

impl<T> From<Lookup<T>> for Option<T> {
    fn from(lookup: Lookup<T>) -> Self {
        lookup.into_option()
    }
}
