//! Deterministic mapping from logical partition identity to partition names.
//!
//! Bar, tick and fundamental-value data is partitioned by data provider (and
//! for bars by resolution and the synthetic flag). Physically everything
//! lives in one namespace keyed by those components; the partition *name* is
//! the stable, human-readable identity used for verification and logging,
//! e.g. `AcmeInstrumentDataSyntheticMinute`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

// =============================================================================
// ProviderId
// =============================================================================

/// Data-provider identity, used purely as a partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(pub String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProviderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProviderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Granularity of a bar series, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    Level1,
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl Resolution {
    /// Every bar resolution, ascending. `Level1` is excluded since tick data
    /// lives in its own table.
    pub const BAR_RESOLUTIONS: [Resolution; 5] = [
        Resolution::Minute,
        Resolution::Hour,
        Resolution::Day,
        Resolution::Week,
        Resolution::Month,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Level1 => "Level1",
            Resolution::Minute => "Minute",
            Resolution::Hour => "Hour",
            Resolution::Day => "Day",
            Resolution::Week => "Week",
            Resolution::Month => "Month",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Level1" => Ok(Resolution::Level1),
            "Minute" => Ok(Resolution::Minute),
            "Hour" => Ok(Resolution::Hour),
            "Day" => Ok(Resolution::Day),
            "Week" => Ok(Resolution::Week),
            "Month" => Ok(Resolution::Month),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown resolution '{}'",
                other
            )))),
        }
    }
}

// =============================================================================
// Partition
// =============================================================================

/// Logical table families that are partitioned by provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionKind {
    InstrumentData,
    Level1Data,
    CountryFundamentalAssociations,
    CountryFundamentalValues,
    InstrumentFundamentalAssociations,
    InstrumentFundamentalValues,
}

impl PartitionKind {
    fn suffix(&self) -> &'static str {
        match self {
            PartitionKind::InstrumentData => "InstrumentData",
            PartitionKind::Level1Data => "InstrumentDataLevel1",
            PartitionKind::CountryFundamentalAssociations => "CountryFundamentalAssociations",
            PartitionKind::CountryFundamentalValues => "CountryFundamentalValues",
            PartitionKind::InstrumentFundamentalAssociations => {
                "InstrumentFundamentalAssociations"
            }
            PartitionKind::InstrumentFundamentalValues => "InstrumentFundamentalValues",
        }
    }
}

/// Identity of one provider-scoped partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    pub provider: ProviderId,
    pub kind: PartitionKind,
    pub resolution: Option<Resolution>,
    pub synthetic: bool,
}

impl Partition {
    pub fn bars(provider: ProviderId, resolution: Resolution, synthetic: bool) -> Self {
        Self {
            provider,
            kind: PartitionKind::InstrumentData,
            resolution: Some(resolution),
            synthetic,
        }
    }

    pub fn level1(provider: ProviderId) -> Self {
        Self {
            provider,
            kind: PartitionKind::Level1Data,
            resolution: None,
            synthetic: false,
        }
    }

    pub fn fundamental_values(provider: ProviderId, kind: PartitionKind) -> Self {
        Self {
            provider,
            kind,
            resolution: None,
            synthetic: false,
        }
    }

    /// Deterministic partition name, e.g. `AcmeInstrumentDataDay`,
    /// `AcmeInstrumentDataSyntheticMinute`, `AcmeCountryFundamentalValues`.
    pub fn name(&self) -> String {
        let mut name = String::with_capacity(48);
        name.push_str(self.provider.as_str());
        name.push_str(self.kind.suffix());
        if self.synthetic {
            name.push_str("Synthetic");
        }
        if let Some(resolution) = self.resolution {
            name.push_str(resolution.as_str());
        }
        name
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_partition_names() {
        let p = Partition::bars(ProviderId::from("Acme"), Resolution::Day, false);
        assert_eq!(p.name(), "AcmeInstrumentDataDay");

        let p = Partition::bars(ProviderId::from("Acme"), Resolution::Minute, true);
        assert_eq!(p.name(), "AcmeInstrumentDataSyntheticMinute");
    }

    #[test]
    fn fundamental_partition_names() {
        let p = Partition::fundamental_values(
            ProviderId::from("Acme"),
            PartitionKind::CountryFundamentalValues,
        );
        assert_eq!(p.name(), "AcmeCountryFundamentalValues");

        let p = Partition::fundamental_values(
            ProviderId::from("Other"),
            PartitionKind::InstrumentFundamentalAssociations,
        );
        assert_eq!(p.name(), "OtherInstrumentFundamentalAssociations");
    }

    #[test]
    fn level1_partition_name() {
        let p = Partition::level1(ProviderId::from("Acme"));
        assert_eq!(p.name(), "AcmeInstrumentDataLevel1");
    }

    #[test]
    fn resolution_ordering_is_ascending_granularity() {
        assert!(Resolution::Level1 < Resolution::Minute);
        assert!(Resolution::Minute < Resolution::Hour);
        assert!(Resolution::Hour < Resolution::Day);
        assert!(Resolution::Day < Resolution::Week);
        assert!(Resolution::Week < Resolution::Month);
    }

    #[test]
    fn resolution_round_trips_through_storage_string() {
        for r in Resolution::BAR_RESOLUTIONS {
            assert_eq!(r.as_str().parse::<Resolution>().unwrap(), r);
        }
        assert_eq!("Level1".parse::<Resolution>().unwrap(), Resolution::Level1);
        assert!("Tick".parse::<Resolution>().is_err());
    }
}
