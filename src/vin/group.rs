use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManufacturerGroup {
    Ford,
    Stellantis,
    Mazda,
    Hyundai,
    Honda,
    Kia,
    Nissan,
    Toyota,
    Unknown,
}

impl ManufacturerGroup {
    /// Detection order. `Unknown` is the fallback and never matched directly.
    pub const DETECTABLE: [ManufacturerGroup; 8] = [
        ManufacturerGroup::Ford,
        ManufacturerGroup::Stellantis,
        ManufacturerGroup::Mazda,
        ManufacturerGroup::Hyundai,
        ManufacturerGroup::Honda,
        ManufacturerGroup::Kia,
        ManufacturerGroup::Nissan,
        ManufacturerGroup::Toyota,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ManufacturerGroup::Ford => "ford",
            ManufacturerGroup::Stellantis => "stellantis",
            ManufacturerGroup::Mazda => "mazda",
            ManufacturerGroup::Hyundai => "hyundai",
            ManufacturerGroup::Honda => "honda",
            ManufacturerGroup::Kia => "kia",
            ManufacturerGroup::Nissan => "nissan",
            ManufacturerGroup::Toyota => "toyota",
            ManufacturerGroup::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ManufacturerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
