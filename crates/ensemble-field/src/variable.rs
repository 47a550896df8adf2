//! Variable kinds and their native names.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Abstract meteorological quantity, independent of how a file names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// 2 m air temperature (K).
    Temperature,
    /// Precipitation over the output interval.
    Precipitation,
    /// Precipitation accumulated since the forecast start.
    PrecipitationAccumulated,
    /// Total cloud area fraction.
    CloudFraction,
    /// 10 m wind speed.
    WindSpeed,
    /// Relative humidity.
    RelativeHumidity,
    /// Surface air pressure.
    Pressure,
}

impl VariableKind {
    /// Every kind, in declaration order.
    pub const ALL: [VariableKind; 7] = [
        Self::Temperature,
        Self::Precipitation,
        Self::PrecipitationAccumulated,
        Self::CloudFraction,
        Self::WindSpeed,
        Self::RelativeHumidity,
        Self::Pressure,
    ];

    /// Snake-case identifier used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Precipitation => "precipitation",
            Self::PrecipitationAccumulated => "precipitation_accumulated",
            Self::CloudFraction => "cloud_fraction",
            Self::WindSpeed => "wind_speed",
            Self::RelativeHumidity => "relative_humidity",
            Self::Pressure => "pressure",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VariableKind {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| FieldError::Config(format!("unknown variable kind '{}'", s)))
    }
}

/// Native variable name of `kind` in the EC ensemble convention.
///
/// The match is exhaustive so adding a kind forces a decision here.
fn ec_name(kind: VariableKind) -> Option<&'static str> {
    match kind {
        VariableKind::Temperature => Some("t"),
        VariableKind::Precipitation => Some("precipitation_amount"),
        VariableKind::PrecipitationAccumulated => Some("precipitation_amount_acc"),
        VariableKind::CloudFraction => Some("cloud_area_fraction"),
        VariableKind::WindSpeed => None,
        VariableKind::RelativeHumidity => None,
        VariableKind::Pressure => None,
    }
}

/// Maps variable kinds to native names.
///
/// Starts from the EC convention; entries in `overrides` replace it per kind.
/// An empty override unmaps the kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameTable {
    overrides: BTreeMap<VariableKind, String>,
}

impl NameTable {
    /// Table with only the built-in convention.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the native name of `kind`.
    pub fn with_name(mut self, kind: VariableKind, name: impl Into<String>) -> Self {
        self.overrides.insert(kind, name.into());
        self
    }

    /// Native name of `kind`, or `None` if the kind is not mapped.
    pub fn resolve(&self, kind: VariableKind) -> Option<&str> {
        let name = match self.overrides.get(&kind) {
            Some(name) => name.as_str(),
            None => ec_name(kind)?,
        };
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Kinds that currently resolve to a name.
    pub fn mapped_kinds(&self) -> Vec<VariableKind> {
        VariableKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.resolve(*kind).is_some())
            .collect()
    }
}
