//! Traits describing provider capabilities and the errors they raise.

use std::io::Error as IoError;

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::hours::HoursError;
use crate::model::{Facility, MunicipalityMeta};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while loading a facility dataset.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Reading a local dataset failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
    /// The dataset is not valid JSON or not a feature collection.
    #[error("Decode error: {0}")]
    Decode(String),
    /// A feature carries opening hours that do not parse.
    #[error("Feature {feature}: {source}")]
    Hours {
        /// Identifier or index of the offending feature.
        feature: String,
        /// Underlying parse failure.
        #[source]
        source: HoursError,
    },
    /// A feature is missing required data or has an unknown value.
    #[error("Feature {feature}: {reason}")]
    InvalidFeature {
        /// Identifier or index of the offending feature.
        feature: String,
        /// What is wrong with it.
        reason: String,
    },
    /// No dataset is registered for the municipality.
    #[error("Unsupported municipality")]
    UnsupportedMunicipality,
}

#[async_trait]
/// Trait for backends that supply the facilities of one municipality.
pub trait FacilityPort: Send + Sync {
    /// Metadata describing the municipality served by this port.
    fn municipality(&self) -> &MunicipalityMeta;

    /// Load every facility of the dataset.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the source cannot be read or contains bad data.
    async fn load(&self) -> Result<Vec<Facility>, PortError>;
}
