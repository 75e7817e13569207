//! Numeric sort priority
//!
//! Priorities distinguish three states so that automatic values never leak
//! into persisted manifests: never set, assigned by a container on `add`,
//! or authored explicitly.

use std::cmp::Ordering;
use std::fmt;

/// Default gap between automatically assigned priorities
pub const DEFAULT_PRIORITY_STEP: i64 = 1000;

/// Sort priority of an item or group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// No priority yet; the owning container assigns one on `add`
    #[default]
    Unset,
    /// Assigned automatically by spacing
    Auto(i64),
    /// Authored explicitly (persisted)
    Explicit(i64),
}

impl Priority {
    /// Returns the numeric value, if any
    pub fn value(&self) -> Option<i64> {
        match self {
            Priority::Unset => None,
            Priority::Auto(v) | Priority::Explicit(v) => Some(*v),
        }
    }

    /// Returns true if no value has been assigned
    pub fn is_unset(&self) -> bool {
        matches!(self, Priority::Unset)
    }

    /// Returns the value only if it was authored explicitly
    pub fn explicit(&self) -> Option<i64> {
        match self {
            Priority::Explicit(v) => Some(*v),
            _ => None,
        }
    }

    /// Orders priorities ascending with unset values last
    pub fn sort_cmp(&self, other: &Priority) -> Ordering {
        match (self.value(), other.value()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl From<Option<i64>> for Priority {
    fn from(value: Option<i64>) -> Self {
        value.map(Priority::Explicit).unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Unset => write!(f, "-"),
            Priority::Auto(v) => write!(f, "{} (auto)", v),
            Priority::Explicit(v) => write!(f, "{}", v),
        }
    }
}

/// Returns the next multiple of `step` strictly greater than `last`
///
/// A non-positive `step` falls back to [`DEFAULT_PRIORITY_STEP`]. Saturates
/// at `i64::MAX`.
pub fn next_spaced(last: i64, step: i64) -> i64 {
    let step = if step > 0 { step } else { DEFAULT_PRIORITY_STEP };
    last.div_euclid(step)
        .checked_add(1)
        .and_then(|n| n.checked_mul(step))
        .unwrap_or(i64::MAX)
}
