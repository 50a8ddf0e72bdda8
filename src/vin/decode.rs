use serde::Serialize;

use super::group::ManufacturerGroup;
use super::normalize::{VIN_LENGTH, normalize_vin};
use super::tables::{FORD_PLANTS, WMI_MAKES, group_prefixes};

pub const UNKNOWN_MAKE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FordHold {
    pub hold_code: &'static str,
    pub plant_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedVinInfo {
    pub vin_normalized: String,
    pub vin_length: usize,
    pub is_full_vin: bool,
    pub manufacturer_group: ManufacturerGroup,
    pub likely_make: String,
    /// Positions 1-3.
    pub wmi: String,
    /// Positions 4-9.
    pub vds: String,
    /// Positions 10-17.
    pub vis: String,
    /// 11th character, empty when the VIN is shorter.
    pub assembly_char: String,
    pub ford_hold: Option<FordHold>,
}

/// Decodes whatever the caller has, full VIN or not. Short or malformed
/// input yields empty segments and the unknown group.
pub fn decode_vin_info(vin: &str) -> DecodedVinInfo {
    let normalized = normalize_vin(vin);
    let manufacturer_group = group_for_normalized(&normalized);
    let assembly = assembly_char(&normalized);

    DecodedVinInfo {
        vin_length: normalized.len(),
        is_full_vin: normalized.len() == VIN_LENGTH,
        manufacturer_group,
        likely_make: make_for_normalized(&normalized).to_string(),
        wmi: segment(&normalized, 0, 3).to_string(),
        vds: segment(&normalized, 3, 9).to_string(),
        vis: segment(&normalized, 9, VIN_LENGTH).to_string(),
        assembly_char: assembly.map(String::from).unwrap_or_default(),
        ford_hold: ford_hold_for(manufacturer_group, assembly),
        vin_normalized: normalized,
    }
}

pub fn detect_manufacturer_group_from_vin(vin: &str) -> ManufacturerGroup {
    group_for_normalized(&normalize_vin(vin))
}

pub fn detect_likely_make_from_vin(vin: &str) -> String {
    make_for_normalized(&normalize_vin(vin)).to_string()
}

pub fn decode_ford_hold_from_vin(vin: &str) -> Option<FordHold> {
    let normalized = normalize_vin(vin);
    ford_hold_for(group_for_normalized(&normalized), assembly_char(&normalized))
}

fn group_for_normalized(vin: &str) -> ManufacturerGroup {
    let Some(wmi) = vin.get(..3) else {
        return ManufacturerGroup::Unknown;
    };
    ManufacturerGroup::DETECTABLE
        .into_iter()
        .find(|group| {
            group_prefixes(*group)
                .iter()
                .any(|prefix| wmi.starts_with(*prefix))
        })
        .unwrap_or(ManufacturerGroup::Unknown)
}

fn make_for_normalized(vin: &str) -> &'static str {
    let Some(wmi) = vin.get(..3) else {
        return UNKNOWN_MAKE;
    };
    WMI_MAKES
        .iter()
        .find(|(prefix, _)| wmi.starts_with(*prefix))
        .map(|(_, make)| *make)
        .unwrap_or(UNKNOWN_MAKE)
}

fn ford_hold_for(group: ManufacturerGroup, assembly: Option<char>) -> Option<FordHold> {
    if group != ManufacturerGroup::Ford {
        return None;
    }
    let assembly = assembly?;
    FORD_PLANTS
        .iter()
        .find(|(key, _, _)| *key == assembly)
        .map(|&(_, hold_code, plant_name)| FordHold {
            hold_code,
            plant_name,
        })
}

fn assembly_char(vin: &str) -> Option<char> {
    vin.chars().nth(10)
}

// Normalized VINs are ASCII, so byte offsets are character offsets.
fn segment(vin: &str, start: usize, end: usize) -> &str {
    let end = end.min(vin.len());
    vin.get(start..end).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ford_vin() {
        let info = decode_vin_info("1FAHP3F20CL123456");
        assert_eq!(info.vin_normalized, "1FAHP3F20CL123456");
        assert_eq!(info.vin_length, 17);
        assert!(info.is_full_vin);
        assert_eq!(info.manufacturer_group, ManufacturerGroup::Ford);
        assert_eq!(info.likely_make, "Ford");
        assert_eq!(info.wmi, "1FA");
        assert_eq!(info.vds, "HP3F20");
        assert_eq!(info.vis, "CL123456");
        assert_eq!(info.assembly_char, "L");
        assert_eq!(
            info.ford_hold,
            Some(FordHold {
                hold_code: "AP02A",
                plant_name: "Michigan Assembly",
            })
        );
    }

    #[test]
    fn assembly_char_is_position_eleven() {
        let info = decode_vin_info("1FAHP3F20CL123456");
        assert_eq!(info.vin_normalized.chars().nth(10), Some('L'));
        let info = decode_vin_info("1FAHP3F2XC123456L");
        assert_eq!(info.assembly_char, "1");
    }

    #[test]
    fn short_input_degrades() {
        for input in ["", "1F", " - ", "a"] {
            let info = decode_vin_info(input);
            assert_eq!(info.manufacturer_group, ManufacturerGroup::Unknown);
            assert_eq!(info.likely_make, UNKNOWN_MAKE);
            assert!(!info.is_full_vin);
            assert_eq!(info.vds, "");
            assert_eq!(info.vis, "");
            assert_eq!(info.assembly_char, "");
            assert!(info.ford_hold.is_none());
        }
    }

    #[test]
    fn partial_vin_yields_partial_segments() {
        let info = decode_vin_info("1fa-hp3f2");
        assert_eq!(info.vin_normalized, "1FAHP3F2");
        assert_eq!(info.wmi, "1FA");
        assert_eq!(info.vds, "HP3F2");
        assert_eq!(info.vis, "");
        assert_eq!(info.manufacturer_group, ManufacturerGroup::Ford);
        assert!(info.ford_hold.is_none());
    }

    #[test]
    fn stellantis_makes_are_brand_specific() {
        assert_eq!(
            detect_manufacturer_group_from_vin("1C4RJFAG5FC123456"),
            ManufacturerGroup::Stellantis
        );
        assert_eq!(detect_likely_make_from_vin("1C4RJFAG5FC123456"), "Jeep");
        assert_eq!(detect_likely_make_from_vin("2C4RC1BG0HR123456"), "Chrysler");
        assert_eq!(detect_likely_make_from_vin("1J4GL48K75W123456"), "Jeep");
        assert_eq!(
            detect_manufacturer_group_from_vin("1J4GL48K75W123456"),
            ManufacturerGroup::Stellantis
        );
    }

    #[test]
    fn other_groups_detected() {
        assert_eq!(
            detect_manufacturer_group_from_vin("JM1BL1SF1A1123456"),
            ManufacturerGroup::Mazda
        );
        assert_eq!(
            detect_manufacturer_group_from_vin("5NPE24AF1FH123456"),
            ManufacturerGroup::Hyundai
        );
        assert_eq!(
            detect_manufacturer_group_from_vin("19XFC2F59GE123456"),
            ManufacturerGroup::Honda
        );
        assert_eq!(
            detect_manufacturer_group_from_vin("KNDJP3A51H7123456"),
            ManufacturerGroup::Kia
        );
        assert_eq!(
            detect_manufacturer_group_from_vin("3N1AB7AP5HY123456"),
            ManufacturerGroup::Nissan
        );
        assert_eq!(
            detect_manufacturer_group_from_vin("4T1BF1FK5HU123456"),
            ManufacturerGroup::Toyota
        );
        assert_eq!(
            detect_manufacturer_group_from_vin("WVWZZZ1JZXW123456"),
            ManufacturerGroup::Unknown
        );
        assert_eq!(detect_likely_make_from_vin("WVWZZZ1JZXW123456"), UNKNOWN_MAKE);
    }

    #[test]
    fn ford_hold_requires_ford_and_known_plant() {
        assert_eq!(
            decode_ford_hold_from_vin("1FAHP3F20JJ123456").map(|hold| hold.hold_code),
            Some("GN4UA")
        );
        assert!(decode_ford_hold_from_vin("1FAHP3F20CZ123456").is_none());
        assert!(decode_vin_info("1FAHP3F20CZ123456").ford_hold.is_none());
        assert!(decode_ford_hold_from_vin("4T1BF1FK5HL123456").is_none());
        assert!(decode_ford_hold_from_vin("1FAHP3F20C").is_none());
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ["1fah p3f2-0cl 123456", "vin: 1FA#HP3", "ÄÖ 1c4", ""] {
            let once = decode_vin_info(input);
            let twice = decode_vin_info(&crate::vin::normalize_vin_light(input));
            assert_eq!(once.vin_normalized, twice.vin_normalized);
            assert!(
                once.vin_normalized
                    .chars()
                    .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
            );
        }
    }
}
