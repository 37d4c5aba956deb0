//! Domain data structures for municipalities and their toilet facilities.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hours::OpeningHours;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a municipality dataset known to toiletkaart.
pub struct MunicipalityId(pub String);

impl fmt::Display for MunicipalityId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a municipality and its human-friendly name.
pub struct MunicipalityMeta {
    /// Unique identifier.
    pub id: MunicipalityId,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of a facility within its dataset.
pub struct FacilityId(pub String);

impl fmt::Display for FacilityId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Who owns and operates a facility.
pub enum Ownership {
    /// Publicly accessible, operated by a third party.
    Public,
    /// Private facility open to visitors.
    Private,
    /// Operated by the municipality.
    Municipal,
}

impl Ownership {
    /// Every ownership category, in display order.
    pub const ALL: [Self; 3] = [Self::Public, Self::Private, Self::Municipal];

    /// Lowercase token used in source data.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Municipal => "municipal",
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.token())
    }
}

impl FromStr for Ownership {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let wanted = text.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|ownership| ownership.token() == wanted)
            .ok_or_else(|| format!("unknown ownership {text:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Yes/no attributes a facility can be filtered on.
pub enum Attribute {
    /// Only a urinal, no cubicle.
    UrinalOnly,
    /// Usage costs money.
    Fee,
    /// Wheelchair accessible.
    Wheelchair,
    /// Accessible with extra facilities (changing bench, hoist).
    WheelchairPlus,
}

impl Attribute {
    /// Every boolean attribute, in display order.
    pub const ALL: [Self; 4] = [
        Self::UrinalOnly,
        Self::Fee,
        Self::Wheelchair,
        Self::WheelchairPlus,
    ];

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UrinalOnly => "urinal only",
            Self::Fee => "fee",
            Self::Wheelchair => "wheelchair accessible",
            Self::WheelchairPlus => "wheelchair accessible plus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// WGS84 position of a facility.
pub struct Location {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A toilet facility as loaded from a dataset. Never mutated after load.
pub struct Facility {
    /// Identifier within the dataset.
    pub id: FacilityId,
    /// Optional display name.
    pub name: Option<String>,
    /// Position, when the source geometry is a point.
    pub location: Option<Location>,
    /// When the facility is open.
    pub opening_hours: OpeningHours,
    /// Only a urinal is available.
    pub urinal_only: bool,
    /// Usage costs money.
    pub fee: bool,
    /// Wheelchair accessible.
    pub wheelchair: bool,
    /// Accessible with extra facilities.
    pub wheelchair_plus: bool,
    /// Operator category.
    pub ownership: Ownership,
    /// Raw source properties rendered as text, for detail views.
    pub properties: BTreeMap<String, String>,
}

impl Facility {
    /// Value of a boolean attribute.
    #[must_use]
    pub fn flag(&self, attribute: Attribute) -> bool {
        match attribute {
            Attribute::UrinalOnly => self.urinal_only,
            Attribute::Fee => self.fee,
            Attribute::Wheelchair => self.wheelchair,
            Attribute::WheelchairPlus => self.wheelchair_plus,
        }
    }

    /// Name if present, otherwise the identifier.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}
