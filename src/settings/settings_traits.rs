//! Configuration capability trait.
//!
//! Configuration loading (files, environment, culture detection) lives outside
//! this crate; consumers inject anything implementing [`SettingsProvider`].

use crate::partitions::ProviderId;
use crate::settings::settings_model::DisplayTimeZoneMode;

/// Narrow view of application configuration the store and feed depend on.
pub trait SettingsProvider: Send + Sync {
    /// Time-zone mode applied to feed output timestamps.
    fn display_time_zone_mode(&self) -> DisplayTimeZoneMode;

    /// Registry of every known data provider identity. Provider names are
    /// partition-key components; consumers use this to enumerate the
    /// provider-scoped partitions that can exist.
    fn providers(&self) -> Vec<ProviderId>;

    /// BCP-47 culture tag, e.g. "en-US".
    fn culture(&self) -> String;
}
