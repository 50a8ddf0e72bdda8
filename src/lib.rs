use anyhow::{Context, Result, anyhow};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

pub mod logging;
pub mod ocr;
pub mod prefill;
pub mod settings;
mod test_util;
pub mod vin;

pub use ocr::{OcrEngine, TesseractEngine, extract_vin_from_image};
pub use prefill::{MakeModel, PrefillTracker, Prefiller, prefill_make_model_from_vin};
pub use vin::{
    DecodedVinInfo, ExtractionStage, ManufacturerGroup, decode_vin_info, extract_vin,
    has_vin_ambiguous_chars, normalize_vin_light,
};

const AMBIGUOUS_NOTE: &str = "Note: VINs cannot contain I, O, or Q. Please verify those characters.";

#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,
    pub json: bool,
    pub settings_path: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Decode {
        vin: String,
    },
    Check {
        vin: String,
    },
    Extract {
        image: Option<String>,
        text: Option<String>,
        candidates: bool,
    },
    Prefill {
        vin: String,
    },
}

pub async fn run(config: Config) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;

    match config.command {
        Command::Decode { vin } => {
            let info = decode_vin_info(&vin);
            if config.json {
                return Ok(serde_json::to_string_pretty(&info)?);
            }
            Ok(format_decoded(&info, has_vin_ambiguous_chars(&vin)))
        }
        Command::Check { vin } => {
            let normalized = normalize_vin_light(&vin);
            let valid = vin::is_valid_vin17(&normalized);
            let ambiguous = has_vin_ambiguous_chars(&vin);
            if config.json {
                let value = json!({
                    "vin": normalized,
                    "valid": valid,
                    "ambiguous": ambiguous,
                });
                return Ok(serde_json::to_string_pretty(&value)?);
            }
            Ok(format_check(&normalized, valid, ambiguous))
        }
        Command::Extract {
            image,
            text,
            candidates,
        } => {
            if let Some(image) = image {
                let engine: Arc<dyn OcrEngine> =
                    Arc::new(TesseractEngine::from_settings(&settings.ocr));
                let found = extract_vin_from_image(engine, image).await;
                return format_extraction(found.as_deref(), None, config.json);
            }
            let text = text.ok_or_else(|| anyhow!("no OCR text to extract a VIN from"))?;
            let blocks = [text];
            if candidates {
                let lines = vin::split_lines(&blocks);
                let scored = vin::scan_candidates(&lines);
                if config.json {
                    return Ok(serde_json::to_string_pretty(&scored)?);
                }
                return Ok(format_candidates(&scored, &lines));
            }
            let extraction = vin::extract_vin_with_stage(&blocks);
            format_extraction(
                extraction.as_ref().map(|found| found.vin.as_str()),
                extraction.as_ref().map(|found| found.stage),
                config.json,
            )
        }
        Command::Prefill { vin } => {
            let result = Prefiller::new(&settings.prefill).prefill(&vin).await;
            if config.json {
                return Ok(serde_json::to_string_pretty(&result)?);
            }
            Ok(format_make_model(&result))
        }
    }
}

pub fn format_decoded(info: &DecodedVinInfo, ambiguous: bool) -> String {
    let or_dash = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };
    let vin = if info.vin_normalized.is_empty() {
        "(none)".to_string()
    } else {
        info.vin_normalized.clone()
    };

    let mut lines = vec![
        format!("VIN: {}", vin),
        format!("Length: {}", info.vin_length),
        format!("Full VIN: {}", if info.is_full_vin { "yes" } else { "no" }),
        format!("Make: {}", info.likely_make),
        format!("Group: {}", info.manufacturer_group),
        format!("WMI (1-3): {}", or_dash(&info.wmi)),
        format!("VDS (4-9): {}", or_dash(&info.vds)),
        format!("VIS (10-17): {}", or_dash(&info.vis)),
        format!("11th char: {}", or_dash(&info.assembly_char)),
    ];
    if let Some(hold) = info.ford_hold {
        lines.push(format!("Ford hold code: {}", hold.hold_code));
        lines.push(format!("Plant: {}", hold.plant_name));
    }
    if ambiguous {
        lines.push(AMBIGUOUS_NOTE.to_string());
    }
    lines.join("\n")
}

fn format_check(normalized: &str, valid: bool, ambiguous: bool) -> String {
    let yes_no = |value: bool| if value { "yes" } else { "no" };
    [
        format!("VIN: {}", normalized),
        format!("Valid: {}", yes_no(valid)),
        format!("Ambiguous characters: {}", yes_no(ambiguous)),
    ]
    .join("\n")
}

fn format_extraction(
    vin: Option<&str>,
    stage: Option<ExtractionStage>,
    json: bool,
) -> Result<String> {
    if json {
        let value = json!({
            "vin": vin,
            "stage": stage,
        });
        return serde_json::to_string_pretty(&value).with_context(|| "failed to render JSON");
    }
    Ok(match (vin, stage) {
        (Some(vin), Some(stage)) => format!("{}\t{}", vin, stage.as_str()),
        (Some(vin), None) => vin.to_string(),
        (None, _) => "no VIN found".to_string(),
    })
}

fn format_candidates(candidates: &[vin::VinCandidate], lines: &[String]) -> String {
    if candidates.is_empty() {
        return "no 17-character candidates".to_string();
    }
    candidates
        .iter()
        .map(|candidate| {
            let line = lines
                .get(candidate.line)
                .map(String::as_str)
                .unwrap_or_default();
            let label = if candidate.from_label { "label" } else { "line" };
            format!(
                "{}\t{}\t{}\t{}",
                candidate.score, candidate.value, label, line
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_make_model(result: &MakeModel) -> String {
    let model = if result.model.is_empty() {
        "-"
    } else {
        result.model.as_str()
    };
    format!("Make: {}\nModel: {}", result.make, model)
}
