use serde::{Deserialize, Serialize};

use crate::partitions::ProviderId;
use crate::settings::settings_traits::SettingsProvider;

/// Time zone applied to feed output timestamps at read time.
///
/// Stored data is always UTC; this only affects presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DisplayTimeZoneMode {
    /// Host local time.
    Local,
    /// The instrument's exchange time zone.
    Exchange,
    /// No conversion.
    #[default]
    Utc,
}

/// Fixed, in-memory settings. The production shell wires its own
/// [`SettingsProvider`]; this one covers embedded use and tests.
#[derive(Debug, Clone)]
pub struct StaticSettings {
    pub time_zone_mode: DisplayTimeZoneMode,
    pub providers: Vec<ProviderId>,
    pub culture: String,
}

impl StaticSettings {
    pub fn new(time_zone_mode: DisplayTimeZoneMode, providers: Vec<ProviderId>) -> Self {
        Self {
            time_zone_mode,
            providers,
            culture: "en-US".to_string(),
        }
    }
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self::new(DisplayTimeZoneMode::Utc, Vec::new())
    }
}

impl SettingsProvider for StaticSettings {
    fn display_time_zone_mode(&self) -> DisplayTimeZoneMode {
        self.time_zone_mode
    }

    fn providers(&self) -> Vec<ProviderId> {
        self.providers.clone()
    }

    fn culture(&self) -> String {
        self.culture.clone()
    }
}
