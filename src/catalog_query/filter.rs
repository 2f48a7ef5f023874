//! Filter selection and event filtering

use crate::event_store::Event;
use crate::models::{Category, Eligibility, FilterValue, VerificationTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selected values per dimension. An empty set means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub categories: BTreeSet<Category>,
    pub verification: BTreeSet<VerificationTier>,
    pub eligibility: BTreeSet<Eligibility>,
}

impl FilterSelection {
    /// Turn a single value on or off
    pub fn set(&mut self, value: FilterValue, on: bool) {
        fn apply<T: Ord>(set: &mut BTreeSet<T>, value: T, on: bool) {
            if on {
                set.insert(value);
            } else {
                set.remove(&value);
            }
        }

        match value {
            FilterValue::Category(c) => apply(&mut self.categories, c, on),
            FilterValue::Verification(t) => apply(&mut self.verification, t, on),
            FilterValue::Eligibility(e) => apply(&mut self.eligibility, e, on),
        }
    }

    /// Flip a value (checkbox semantics)
    pub fn toggle(&mut self, value: FilterValue) {
        let on = !self.contains(value);
        self.set(value, on);
    }

    pub fn contains(&self, value: FilterValue) -> bool {
        match value {
            FilterValue::Category(c) => self.categories.contains(&c),
            FilterValue::Verification(t) => self.verification.contains(&t),
            FilterValue::Eligibility(e) => self.eligibility.contains(&e),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.verification.is_empty() && self.eligibility.is_empty()
    }

    /// AND across dimensions, OR within a dimension
    pub fn matches(&self, event: &Event) -> bool {
        fn admits<T: Ord>(set: &BTreeSet<T>, value: &T) -> bool {
            set.is_empty() || set.contains(value)
        }

        admits(&self.categories, &event.category)
            && admits(&self.verification, &event.verification_tier)
            && admits(&self.eligibility, &event.eligibility)
    }
}

/// Events passing `selection`, in source order
pub fn filter_events<'a>(events: &'a [Event], selection: &FilterSelection) -> Vec<&'a Event> {
    events.iter().filter(|e| selection.matches(e)).collect()
}
