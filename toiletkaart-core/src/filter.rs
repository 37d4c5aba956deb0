//! Filter predicates over facility attributes.
//!
//! Each predicate can be switched on and off independently. Enabled predicates
//! are combined with logical AND; disabled ones are skipped entirely.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{Attribute, Facility, Ownership};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Equality check on a boolean attribute.
pub struct BoolPredicate {
    /// Whether the predicate takes part in matching.
    pub enabled: bool,
    /// Value the attribute must have while enabled.
    pub desired: bool,
}

impl BoolPredicate {
    /// A disabled predicate that remembers `desired` for when it is switched on.
    #[must_use]
    pub const fn disabled(desired: bool) -> Self {
        Self {
            enabled: false,
            desired,
        }
    }

    /// An enabled predicate requiring `desired`.
    #[must_use]
    pub const fn require(desired: bool) -> Self {
        Self {
            enabled: true,
            desired,
        }
    }

    /// Whether `value` passes, ignoring the enabled flag.
    #[must_use]
    pub fn accepts(self, value: bool) -> bool {
        self.desired == value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Set-membership check on the ownership category.
pub struct OwnershipPredicate {
    /// Whether the predicate takes part in matching.
    pub enabled: bool,
    /// Accepted categories; empty means nothing passes while enabled.
    pub accepted: BTreeSet<Ownership>,
}

impl OwnershipPredicate {
    /// Whether `ownership` passes, ignoring the enabled flag.
    #[must_use]
    pub fn accepts(&self, ownership: Ownership) -> bool {
        self.accepted.contains(&ownership)
    }

    /// Add `ownership` to the accepted set, or remove it if present.
    pub fn toggle(&mut self, ownership: Ownership) {
        if !self.accepted.remove(&ownership) {
            self.accepted.insert(ownership);
        }
    }
}

impl Default for OwnershipPredicate {
    fn default() -> Self {
        Self {
            enabled: false,
            accepted: Ownership::ALL.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Snapshot of all filter toggles.
pub struct FilterSpec {
    /// Urinal-only filter.
    pub urinal_only: BoolPredicate,
    /// Fee filter.
    pub fee: BoolPredicate,
    /// Wheelchair filter.
    pub wheelchair: BoolPredicate,
    /// Wheelchair-plus filter.
    pub wheelchair_plus: BoolPredicate,
    /// Ownership filter.
    pub ownership: OwnershipPredicate,
}

impl Default for FilterSpec {
    /// Everything disabled; boolean toggles preset to `true`.
    fn default() -> Self {
        Self {
            urinal_only: BoolPredicate::disabled(true),
            fee: BoolPredicate::disabled(true),
            wheelchair: BoolPredicate::disabled(true),
            wheelchair_plus: BoolPredicate::disabled(true),
            ownership: OwnershipPredicate::default(),
        }
    }
}

impl FilterSpec {
    /// Predicate for a boolean attribute.
    #[must_use]
    pub fn predicate(&self, attribute: Attribute) -> BoolPredicate {
        match attribute {
            Attribute::UrinalOnly => self.urinal_only,
            Attribute::Fee => self.fee,
            Attribute::Wheelchair => self.wheelchair,
            Attribute::WheelchairPlus => self.wheelchair_plus,
        }
    }

    /// Mutable predicate for a boolean attribute.
    pub fn predicate_mut(&mut self, attribute: Attribute) -> &mut BoolPredicate {
        match attribute {
            Attribute::UrinalOnly => &mut self.urinal_only,
            Attribute::Fee => &mut self.fee,
            Attribute::Wheelchair => &mut self.wheelchair,
            Attribute::WheelchairPlus => &mut self.wheelchair_plus,
        }
    }

    /// Builder-style helper enabling a boolean predicate.
    #[must_use]
    pub fn with(mut self, attribute: Attribute, desired: bool) -> Self {
        *self.predicate_mut(attribute) = BoolPredicate::require(desired);
        self
    }

    /// Builder-style helper enabling the ownership predicate.
    #[must_use]
    pub fn with_ownership<I: IntoIterator<Item = Ownership>>(mut self, accepted: I) -> Self {
        self.ownership = OwnershipPredicate {
            enabled: true,
            accepted: accepted.into_iter().collect(),
        };
        self
    }

    /// True when no predicate is enabled, so every facility matches.
    #[must_use]
    pub fn is_vacuous(&self) -> bool {
        !self.ownership.enabled
            && Attribute::ALL
                .into_iter()
                .all(|attribute| !self.predicate(attribute).enabled)
    }

    /// Whether `facility` passes every enabled predicate.
    #[must_use]
    pub fn matches(&self, facility: &Facility) -> bool {
        let flags_pass = Attribute::ALL.into_iter().all(|attribute| {
            let predicate = self.predicate(attribute);
            !predicate.enabled || predicate.accepts(facility.flag(attribute))
        });
        flags_pass && (!self.ownership.enabled || self.ownership.accepts(facility.ownership))
    }
}

/// Free-function form of [`FilterSpec::matches`].
#[must_use]
pub fn matches(facility: &Facility, spec: &FilterSpec) -> bool {
    spec.matches(facility)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::hours::{DayHours, OpeningHours};
    use crate::model::FacilityId;

    fn facility(urinal_only: bool, fee: bool, wheelchair: bool, ownership: Ownership) -> Facility {
        Facility {
            id: FacilityId("t1".to_owned()),
            name: None,
            location: None,
            opening_hours: OpeningHours::Daily(DayHours::Closed),
            urinal_only,
            fee,
            wheelchair,
            wheelchair_plus: false,
            ownership,
            properties: BTreeMap::new(),
        }
    }

    #[test]
    fn vacuous_spec_matches_everything() {
        let spec = FilterSpec::default();
        assert!(spec.is_vacuous());
        for ownership in Ownership::ALL {
            assert!(matches(&facility(true, true, false, ownership), &spec));
            assert!(matches(&facility(false, false, true, ownership), &spec));
        }
    }

    #[test]
    fn equality_predicate_compares_desired_value() {
        let wants_free = FilterSpec::default().with(Attribute::Fee, false);
        assert!(wants_free.matches(&facility(false, false, false, Ownership::Public)));
        assert!(!wants_free.matches(&facility(false, true, false, Ownership::Public)));
    }

    #[test]
    fn disabled_predicate_keeps_desired_value_but_is_skipped() {
        let mut spec = FilterSpec::default().with(Attribute::Wheelchair, true);
        spec.wheelchair.enabled = false;
        assert!(spec.wheelchair.desired);
        assert!(spec.matches(&facility(false, false, false, Ownership::Public)));
    }

    #[test]
    fn predicates_combine_with_and() {
        let spec = FilterSpec::default()
            .with(Attribute::UrinalOnly, true)
            .with(Attribute::Fee, false);
        assert!(spec.matches(&facility(true, false, false, Ownership::Public)));
        assert!(!spec.matches(&facility(true, true, false, Ownership::Public)));
        assert!(!spec.matches(&facility(false, false, false, Ownership::Public)));
    }

    #[test]
    fn ownership_membership() {
        let spec = FilterSpec::default().with_ownership([Ownership::Municipal, Ownership::Public]);
        assert!(spec.matches(&facility(false, false, false, Ownership::Municipal)));
        assert!(!spec.matches(&facility(false, false, false, Ownership::Private)));
    }

    #[test]
    fn empty_ownership_set_rejects_all() {
        let spec = FilterSpec::default().with_ownership([]);
        assert!(!spec.is_vacuous());
        for ownership in Ownership::ALL {
            assert!(!spec.matches(&facility(false, false, false, ownership)));
        }
    }

    #[test]
    fn toggling_ownership_categories() {
        let mut predicate = OwnershipPredicate::default();
        predicate.toggle(Ownership::Private);
        assert!(!predicate.accepts(Ownership::Private));
        predicate.toggle(Ownership::Private);
        assert!(predicate.accepts(Ownership::Private));
    }
}
