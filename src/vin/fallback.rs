use regex::Regex;
use std::cmp::Reverse;
use std::sync::LazyLock;

use super::label::{starts_with_label_token, strip_vin_label_or_keep};
use super::normalize::normalize_vin;

static FULL_VIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-HJ-NPR-Z0-9]{17}").expect("VIN run pattern compiles"));

const MIN_RUN_LENGTH: usize = 8;
const MIN_RUN_LETTERS: usize = 2;
const MIN_RUN_DIGITS: usize = 3;

pub(super) fn first_vin_in_stripped_join(lines: &[String]) -> Option<String> {
    first_full_vin(&stripped_join(lines))
}

pub(super) fn first_vin_in_raw_join(lines: &[String]) -> Option<String> {
    first_full_vin(&lines.join(" "))
}

/// Longest alphanumeric run that still looks VIN-ish. Used when nothing
/// 17 characters long survived OCR.
pub(super) fn best_run(lines: &[String]) -> Option<String> {
    let spaced = stripped_join(lines)
        .to_uppercase()
        .chars()
        .map(|ch| {
            if ch.is_ascii_uppercase() || ch.is_ascii_digit() {
                ch
            } else {
                ' '
            }
        })
        .collect::<String>();

    let mut runs = spaced
        .split_whitespace()
        .filter(|token| token.len() >= MIN_RUN_LENGTH)
        .filter(|token| !starts_with_label_token(token))
        .filter(|token| {
            letter_count(token) >= MIN_RUN_LETTERS && digit_count(token) >= MIN_RUN_DIGITS
        })
        .collect::<Vec<_>>();

    runs.sort_by_key(|token| (Reverse(token.len()), Reverse(digit_count(token)), *token));
    runs.first().map(|token| token.to_string())
}

fn stripped_join(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| strip_vin_label_or_keep(line))
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_full_vin(text: &str) -> Option<String> {
    FULL_VIN
        .find(&normalize_vin(text))
        .map(|found| found.as_str().to_string())
}

fn letter_count(token: &str) -> usize {
    token.chars().filter(char::is_ascii_uppercase).count()
}

fn digit_count(token: &str) -> usize {
    token.chars().filter(char::is_ascii_digit).count()
}
