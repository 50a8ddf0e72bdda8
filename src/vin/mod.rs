mod decode;
mod extract;
mod fallback;
mod group;
mod label;
mod normalize;
mod tables;

pub use decode::{
    DecodedVinInfo, FordHold, UNKNOWN_MAKE, decode_ford_hold_from_vin, decode_vin_info,
    detect_likely_make_from_vin, detect_manufacturer_group_from_vin,
};
pub use extract::{
    Extraction, ExtractionStage, VinCandidate, extract_vin, extract_vin_with_stage,
    scan_candidates, split_lines,
};
pub use group::ManufacturerGroup;
pub use normalize::{
    VIN_LENGTH, has_vin_ambiguous_chars, is_valid_vin17, normalize_vin, normalize_vin_light,
    vin_file_token,
};
