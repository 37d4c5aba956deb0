//! Per-facility classification combining the filter and the opening hours.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter::FilterSpec;
use crate::hours::{HoursError, Moment};
use crate::model::Facility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// What the presentation layer should do with a facility.
pub enum Classification {
    /// Fails the filters; not shown.
    Hidden,
    /// Matches and is open at the selected moment.
    Open,
    /// Matches but is closed at the selected moment.
    Closed,
    /// Matches; the time filter is off so hours were not evaluated.
    Visible,
}

impl Classification {
    /// Whether the facility is drawn at all.
    #[must_use]
    pub fn is_shown(self) -> bool {
        self != Self::Hidden
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Inputs for one re-evaluation, rebuilt from UI state on every change.
pub struct Snapshot {
    /// Active filters.
    pub filters: FilterSpec,
    /// Day and time to check; `None` switches the time filter off.
    pub moment: Option<Moment>,
}

/// Classify one facility.
///
/// Hours are only consulted for facilities that pass the filters.
///
/// # Errors
///
/// Returns [`HoursError::MissingDay`] when the facility has no hours for the
/// selected day.
pub fn classify(facility: &Facility, snapshot: &Snapshot) -> Result<Classification, HoursError> {
    if !snapshot.filters.matches(facility) {
        return Ok(Classification::Hidden);
    }
    let Some(moment) = snapshot.moment else {
        return Ok(Classification::Visible);
    };
    if facility.opening_hours.is_open_at(moment)? {
        Ok(Classification::Open)
    } else {
        Ok(Classification::Closed)
    }
}

/// Classify a collection in order.
///
/// # Errors
///
/// Stops at the first facility whose hours cannot be evaluated.
pub fn classify_all(
    facilities: &[Facility],
    snapshot: &Snapshot,
) -> Result<Vec<Classification>, HoursError> {
    let classes = facilities
        .iter()
        .map(|facility| classify(facility, snapshot))
        .collect::<Result<Vec<_>, _>>()?;

    let tally = Tally::from_classes(&classes);
    debug!(
        open = tally.open,
        closed = tally.closed,
        visible = tally.visible,
        hidden = tally.hidden,
        "classified facilities"
    );
    Ok(classes)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Count of each classification, used for legends and status lines.
pub struct Tally {
    /// Hidden facilities.
    pub hidden: usize,
    /// Open facilities.
    pub open: usize,
    /// Closed facilities.
    pub closed: usize,
    /// Shown without a time check.
    pub visible: usize,
}

impl Tally {
    /// Count a slice of classifications.
    #[must_use]
    pub fn from_classes(classes: &[Classification]) -> Self {
        let mut tally = Self::default();
        for class in classes {
            tally.record(*class);
        }
        tally
    }

    /// Add one classification.
    pub fn record(&mut self, class: Classification) {
        let counter = match class {
            Classification::Hidden => &mut self.hidden,
            Classification::Open => &mut self.open,
            Classification::Closed => &mut self.closed,
            Classification::Visible => &mut self.visible,
        };
        *counter += 1;
    }

    /// Number of facilities drawn.
    #[must_use]
    pub fn shown(&self) -> usize {
        self.open + self.closed + self.visible
    }
}
