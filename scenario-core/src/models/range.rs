use serde::{Deserialize, Serialize};

/// A three-point uncertainty estimate.
///
/// By convention `low <= base <= high`, but nothing enforces it; see
/// [`Range::is_ordered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Range<T> {
    pub low: T,
    pub base: T,
    pub high: T,
}

impl<T> Range<T> {
    pub fn new(
        low: T,
        base: T,
        high: T,
    ) -> Self {
        Self { low, base, high }
    }

    /// Applies `f` to each point, low first.
    pub fn map<U>(
        self,
        mut f: impl FnMut(T) -> U,
    ) -> Range<U> {
        Range {
            low: f(self.low),
            base: f(self.base),
            high: f(self.high),
        }
    }

    /// Applies a fallible `f` to each point, low first.
    ///
    /// Stops at the first error; no partially mapped range is ever returned.
    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<Range<U>, E> {
        Ok(Range {
            low: f(self.low)?,
            base: f(self.base)?,
            high: f(self.high)?,
        })
    }

    pub fn as_ref(&self) -> Range<&T> {
        Range {
            low: &self.low,
            base: &self.base,
            high: &self.high,
        }
    }
}

impl<T: Clone> Range<T> {
    /// A range whose three points are the same value.
    pub fn splat(value: T) -> Self {
        Self {
            low: value.clone(),
            base: value.clone(),
            high: value,
        }
    }
}

impl<T: PartialOrd> Range<T> {
    pub fn is_ordered(&self) -> bool {
        self.low <= self.base && self.base <= self.high
    }
}
