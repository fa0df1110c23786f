use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Synthetic per-day key holding the sum of every category.
pub const TOTAL_KEY: &str = "TOTAL";
/// Label used when a record carries no category at all.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Incident categories that typically involve custody. Declaration order is
/// the scan order of the detector, so it also breaks z-score ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    DrugOffense,
    Warrant,
    Assault,
    Robbery,
    Burglary,
    MotorVehicleTheft,
    WeaponsOffense,
    DisorderlyConduct,
    Prostitution,
    SuspiciousOcc,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::DrugOffense,
        Category::Warrant,
        Category::Assault,
        Category::Robbery,
        Category::Burglary,
        Category::MotorVehicleTheft,
        Category::WeaponsOffense,
        Category::DisorderlyConduct,
        Category::Prostitution,
        Category::SuspiciousOcc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DrugOffense => "Drug Offense",
            Category::Warrant => "Warrant",
            Category::Assault => "Assault",
            Category::Robbery => "Robbery",
            Category::Burglary => "Burglary",
            Category::MotorVehicleTheft => "Motor Vehicle Theft",
            Category::WeaponsOffense => "Weapons Offense",
            Category::DisorderlyConduct => "Disorderly Conduct",
            Category::Prostitution => "Prostitution",
            Category::SuspiciousOcc => "Suspicious Occ",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown watch-list category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// Serialized as the source label so config files and reports read naturally.
impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
