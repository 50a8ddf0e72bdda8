pub const VIN_LENGTH: usize = 17;

/// Uppercases and drops whitespace and hyphens, leaving every other
/// character in place. Meant for VINs typed by hand.
pub fn normalize_vin_light(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '-')
        .collect()
}

/// Uppercases and keeps only `A-Z` and `0-9`.
pub fn normalize_vin(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .filter(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
        .collect()
}

/// `I`, `O` and `Q` never appear in a real VIN but OCR produces them for
/// `1` and `0`. Callers use this to ask for review, not to reject input.
pub fn has_vin_ambiguous_chars(value: &str) -> bool {
    normalize_vin_light(value)
        .chars()
        .any(|ch| matches!(ch, 'I' | 'O' | 'Q'))
}

pub fn is_vin_char(ch: char) -> bool {
    ch.is_ascii_digit() || (ch.is_ascii_uppercase() && !matches!(ch, 'I' | 'O' | 'Q'))
}

pub fn is_valid_vin17(candidate: &str) -> bool {
    candidate.len() == VIN_LENGTH && candidate.chars().all(is_vin_char)
}

/// File-name safe token for a VIN (or any label), `fallback` when nothing
/// alphanumeric is left.
pub fn vin_file_token(value: &str, fallback: &str) -> String {
    let cleaned = normalize_vin(value);
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}
