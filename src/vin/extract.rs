use serde::Serialize;
use tracing::debug;

use super::fallback;
use super::label::{has_vin_keyword, label_token_spans, strip_vin_label};
use super::normalize::{VIN_LENGTH, is_valid_vin17, normalize_vin};

const BASE_SCORE: i32 = 100;
const KEYWORD_ON_LINE_BONUS: i32 = 35;
const KEYWORD_NEARBY_BONUS: i32 = 20;
const LABEL_STRIPPED_BONUS: i32 = 35;
const INSIDE_LABEL_PENALTY: i32 = 70;
const MIXED_CHARS_BONUS: i32 = 6;
const REPEATED_CHAR_PENALTY: i32 = 25;
const MIN_LETTERS: usize = 3;
const MIN_DIGITS: usize = 3;
const REPEAT_RUN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VinCandidate {
    pub value: String,
    pub score: i32,
    /// Index into the prepared line list.
    pub line: usize,
    pub from_label: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStage {
    ScoredLine,
    StrippedJoin,
    RawJoin,
    BestRun,
}

impl ExtractionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStage::ScoredLine => "scored_line",
            ExtractionStage::StrippedJoin => "stripped_join",
            ExtractionStage::RawJoin => "raw_join",
            ExtractionStage::BestRun => "best_run",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub vin: String,
    pub stage: ExtractionStage,
}

type Strategy = fn(&[String]) -> Option<String>;

// Most trustworthy first; the first strategy that answers wins.
const STRATEGIES: [(ExtractionStage, Strategy); 4] = [
    (ExtractionStage::ScoredLine, best_scored_candidate),
    (ExtractionStage::StrippedJoin, fallback::first_vin_in_stripped_join),
    (ExtractionStage::RawJoin, fallback::first_vin_in_raw_join),
    (ExtractionStage::BestRun, fallback::best_run),
];

/// Best guess at a single VIN in OCR output, or `None`.
pub fn extract_vin<S: AsRef<str>>(text_blocks: &[S]) -> Option<String> {
    extract_vin_with_stage(text_blocks).map(|extraction| extraction.vin)
}

pub fn extract_vin_with_stage<S: AsRef<str>>(text_blocks: &[S]) -> Option<Extraction> {
    let lines = split_lines(text_blocks);
    STRATEGIES.iter().find_map(|(stage, strategy)| {
        let vin = strategy(&lines)?;
        debug!("VIN {} found by {} stage", vin, stage.as_str());
        Some(Extraction { vin, stage: *stage })
    })
}

/// Trimmed, non-empty lines of every block, in order.
pub fn split_lines<S: AsRef<str>>(text_blocks: &[S]) -> Vec<String> {
    text_blocks
        .iter()
        .flat_map(|block| block.as_ref().lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every valid 17-character window of every line, scored, in discovery
/// order.
pub fn scan_candidates(lines: &[String]) -> Vec<VinCandidate> {
    let mut candidates = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let prev = idx.checked_sub(1).and_then(|prev| lines.get(prev));
        let next = lines.get(idx + 1);
        let keyword_on_line = has_vin_keyword(line);
        let keyword_nearby = prev.is_some_and(|line| has_vin_keyword(line))
            || next.is_some_and(|line| has_vin_keyword(line));

        let mut targets = vec![(normalize_vin(line), false)];
        if let Some(rest) = strip_vin_label(line) {
            targets.push((normalize_vin(rest), true));
        }

        for (target, from_label) in targets {
            if target.len() < VIN_LENGTH {
                continue;
            }
            let label_spans = label_token_spans(&target);
            for start in 0..=target.len() - VIN_LENGTH {
                let window = &target[start..start + VIN_LENGTH];
                if !is_valid_vin17(window) {
                    continue;
                }
                let mut score = score_window(window);
                if keyword_on_line {
                    score += KEYWORD_ON_LINE_BONUS;
                }
                if keyword_nearby {
                    score += KEYWORD_NEARBY_BONUS;
                }
                if from_label {
                    score += LABEL_STRIPPED_BONUS;
                }
                if label_spans.iter().any(|span| span.contains(&start)) {
                    score -= INSIDE_LABEL_PENALTY;
                }
                candidates.push(VinCandidate {
                    value: window.to_string(),
                    score,
                    line: idx,
                    from_label,
                });
            }
        }
    }

    candidates
}

fn best_scored_candidate(lines: &[String]) -> Option<String> {
    let mut candidates = scan_candidates(lines);
    // Stable: equal scores keep discovery order.
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    if let Some(best) = candidates.first() {
        debug!(
            "{} line candidates, best {} scored {}",
            candidates.len(),
            best.value,
            best.score
        );
    }
    candidates.into_iter().next().map(|candidate| candidate.value)
}

fn score_window(window: &str) -> i32 {
    let letters = window.chars().filter(char::is_ascii_uppercase).count();
    let digits = window.chars().filter(char::is_ascii_digit).count();
    let mut score = BASE_SCORE;
    if letters >= MIN_LETTERS {
        score += MIXED_CHARS_BONUS;
    }
    if digits >= MIN_DIGITS {
        score += MIXED_CHARS_BONUS;
    }
    if has_repeated_run(window, REPEAT_RUN) {
        score -= REPEATED_CHAR_PENALTY;
    }
    score
}

fn has_repeated_run(value: &str, run: usize) -> bool {
    let mut last = None;
    let mut count = 0usize;
    for ch in value.chars() {
        if Some(ch) == last {
            count += 1;
        } else {
            last = Some(ch);
            count = 1;
        }
        if count >= run {
            return true;
        }
    }
    false
}
