//! Business settings sourced from configuration.

use cadence_core::SettingsProvider;
use cadence_domain::{BusinessConfig, BusinessSettings, Result};

/// Settings parsed once from the `business` config section.
#[derive(Debug, Clone, Copy)]
pub struct ConfigSettings {
    settings: BusinessSettings,
}

impl ConfigSettings {
    pub fn from_config(config: &BusinessConfig) -> Result<Self> {
        Ok(Self { settings: config.to_settings()? })
    }

    pub const fn new(settings: BusinessSettings) -> Self {
        Self { settings }
    }
}

impl SettingsProvider for ConfigSettings {
    fn business_settings(&self) -> Result<BusinessSettings> {
        Ok(self.settings)
    }
}
