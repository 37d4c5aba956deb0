//! High-level service facade resolving municipality datasets and loading their facilities.

use std::sync::Arc;

use tracing::info;

use crate::model::{Facility, MunicipalityId};
use crate::plugin::PluginRegistry;
use crate::ports::PortError;

/// Public entry point for loading datasets and classifying facilities.
pub struct ToiletService {
    registry: Arc<PluginRegistry>,
}

impl ToiletService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// List all available municipalities and their display names.
    #[must_use]
    pub fn municipalities(&self) -> Vec<(MunicipalityId, String)> {
        self.registry
            .municipalities()
            .into_iter()
            .map(|meta| (meta.id, meta.name))
            .collect()
    }

    /// Load the facilities of a municipality. Called once per session.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the municipality is unsupported or the dataset
    /// cannot be loaded.
    pub async fn load_facilities(
        &self,
        municipality: &MunicipalityId,
    ) -> Result<Vec<Facility>, PortError> {
        let plugin = self.registry.plugin(municipality)?;
        let facilities = plugin.facility_port.load().await?;
        info!(
            municipality = %municipality,
            count = facilities.len(),
            "loaded facilities"
        );
        Ok(facilities)
    }
}
