//! Registry for all municipality datasets and their ports.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{MunicipalityId, MunicipalityMeta};
use crate::ports::{FacilityPort, PortError};

/// Port implementing the dataset of a single municipality.
pub struct DatasetPlugin {
    /// Static metadata describing the municipality.
    pub meta: MunicipalityMeta,
    /// Implementation for loading facilities.
    pub facility_port: Arc<dyn FacilityPort>,
}

/// Registry that resolves plugins by municipality identifier.
pub struct PluginRegistry {
    plugins: HashMap<MunicipalityId, DatasetPlugin>,
}

impl PluginRegistry {
    /// Build a registry from the provided plugin list.
    #[must_use]
    pub fn new(plugins: Vec<DatasetPlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id.clone(), plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Return metadata for all registered municipalities.
    #[must_use]
    pub fn municipalities(&self) -> Vec<MunicipalityMeta> {
        let mut metas: Vec<MunicipalityMeta> = self
            .plugins
            .values()
            .map(|plugin| plugin.meta.clone())
            .collect();
        metas.sort_by(|left, right| left.name.cmp(&right.name));
        metas
    }

    /// Look up a plugin for the given municipality.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedMunicipality`] when no plugin is registered.
    pub fn plugin(&self, municipality: &MunicipalityId) -> Result<&DatasetPlugin, PortError> {
        self.plugins
            .get(municipality)
            .ok_or(PortError::UnsupportedMunicipality)
    }
}
