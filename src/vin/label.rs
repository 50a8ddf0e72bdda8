use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

// `VIN` or `V1N` at line start or after a non-alphanumeric boundary,
// plus any trailing separators.
static VIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^A-Z0-9])V[I1]N[\s:;#-]*").expect("VIN label pattern compiles")
});

static VIN_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:VIN|VEHICLE\s*ID|VEHICLE\s*IDENTIFICATION)\b")
        .expect("VIN keyword pattern compiles")
});

const LABEL_TOKENS: [&str; 2] = ["VIN", "V1N"];

/// Text after the first VIN label in `line`, if the line carries one.
pub(super) fn strip_vin_label(line: &str) -> Option<&str> {
    VIN_LABEL.find(line).map(|found| &line[found.end()..])
}

pub(super) fn strip_vin_label_or_keep(line: &str) -> &str {
    strip_vin_label(line).unwrap_or(line)
}

pub(super) fn has_vin_keyword(line: &str) -> bool {
    VIN_KEYWORD.is_match(line)
}

pub(super) fn starts_with_label_token(value: &str) -> bool {
    LABEL_TOKENS.iter().any(|token| value.starts_with(token))
}

/// Byte ranges of every `VIN`/`V1N` token in an already normalized string.
pub(super) fn label_token_spans(normalized: &str) -> Vec<Range<usize>> {
    let bytes = normalized.as_bytes();
    let mut spans = Vec::new();
    if bytes.len() < 3 {
        return spans;
    }
    for start in 0..=bytes.len() - 3 {
        let window = &bytes[start..start + 3];
        if LABEL_TOKENS.iter().any(|token| token.as_bytes() == window) {
            spans.push(start..start + 3);
        }
    }
    spans
}
