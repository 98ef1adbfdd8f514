use crate::key::Key;

///
/// KeyRange
///
/// Half-open `[lower, upper)` key interval tagged with its search group.
/// An empty bound is unbounded on that side.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyRange {
    pub lower: Key,
    pub upper: Key,
    pub group: u32,
}

impl KeyRange {
    #[must_use]
    pub const fn new(lower: Key, upper: Key, group: u32) -> Self {
        Self {
            lower,
            upper,
            group,
        }
    }

    /// The bound a scan in direction `desc` starts from.
    #[must_use]
    pub const fn seek_bound(&self, desc: bool) -> &Key {
        if desc { &self.upper } else { &self.lower }
    }

    /// The bound a scan in direction `desc` stops at.
    #[must_use]
    pub const fn stop_bound(&self, desc: bool) -> &Key {
        if desc { &self.lower } else { &self.upper }
    }

    pub(crate) const fn seek_bound_mut(&mut self, desc: bool) -> &mut Key {
        if desc {
            &mut self.upper
        } else {
            &mut self.lower
        }
    }

    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        (self.lower.is_empty() || *key >= self.lower)
            && (self.upper.is_empty() || *key < self.upper)
    }

    /// True when every key of `other` also falls inside `self`.
    #[must_use]
    pub fn contains_range(&self, other: &Self) -> bool {
        let lower_ok = if other.lower.is_empty() {
            self.lower.is_empty()
        } else {
            self.lower.is_empty() || other.lower >= self.lower
        };
        let upper_ok = if other.upper.is_empty() {
            self.upper.is_empty()
        } else {
            self.upper.is_empty() || other.upper <= self.upper
        };

        lower_ok && upper_ok
    }

    /// True when no key can satisfy the range.
    #[must_use]
    pub fn is_void(&self) -> bool {
        !self.lower.is_empty() && !self.upper.is_empty() && self.lower >= self.upper
    }
}
