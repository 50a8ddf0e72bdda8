use anyhow::{Context, Result, anyhow};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

use super::OcrEngine;
use super::preprocess;
use crate::settings::OcrSettings;

/// Runs the `tesseract` CLI. Each preprocessed variant and page mode
/// contributes one text block.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: String,
    languages: String,
    page_modes: Vec<u32>,
}

impl TesseractEngine {
    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            languages: settings.languages.clone(),
            page_modes: settings.page_modes.clone(),
        }
    }

    pub fn list_languages(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.binary)
            .arg("--list-langs")
            .output()
            .with_context(|| format!("failed to run {} --list-langs", self.binary))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("{} --list-langs failed: {}", self.binary, stderr.trim()));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        // First line is a "List of available languages" header.
        Ok(stdout
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn resolve_languages(&self) -> Result<String> {
        let requested = self.languages.trim();
        if requested.is_empty() {
            return Err(anyhow!("ocr languages is empty"));
        }
        let available = match self.list_languages() {
            Ok(list) => list,
            Err(_) => return Ok(requested.to_string()),
        };
        resolve_against(requested, &available)
    }

    fn run(&self, path: &Path, languages: &str, psm: u32) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(languages)
            .arg("--oem")
            .arg("1")
            .arg("--psm")
            .arg(psm.to_string())
            .arg("--dpi")
            .arg("300")
            .output()
            .with_context(|| format!("failed to run {} (is it installed?)", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("{} failed: {}", self.binary, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_supported(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn extract_text(&self, image_path: &Path) -> Result<Vec<String>> {
        let image = image::open(image_path)
            .with_context(|| format!("failed to decode image: {}", image_path.display()))?;
        let languages = self.resolve_languages()?;

        let mut blocks = Vec::new();
        for (variant_idx, variant) in preprocess::preprocess_for_ocr_variants(image)
            .into_iter()
            .enumerate()
        {
            let mut tmp = tempfile::Builder::new()
                .suffix(".png")
                .tempfile()
                .with_context(|| "failed to create temp file for OCR")?;
            variant
                .write_to(&mut tmp, image::ImageFormat::Png)
                .with_context(|| "failed to write temp image for OCR")?;
            tmp.flush().ok();

            for psm in &self.page_modes {
                let text = self.run(tmp.path(), &languages, *psm)?;
                debug!(
                    "tesseract variant {} psm {}: {} chars",
                    variant_idx,
                    psm,
                    text.len()
                );
                if !text.trim().is_empty() {
                    blocks.push(text);
                }
            }
        }
        Ok(blocks)
    }
}

/// Keeps the requested `+`/`,`/space separated languages that tesseract
/// has installed.
fn resolve_against(requested: &str, available: &[String]) -> Result<String> {
    let mut chosen = Vec::new();
    let mut missing = Vec::new();
    for raw in requested.split(['+', ',', ' ']) {
        let lang = raw.trim();
        if lang.is_empty() {
            continue;
        }
        if available.iter().any(|value| value == lang) {
            chosen.push(lang.to_string());
        } else {
            missing.push(lang.to_string());
        }
    }

    if chosen.is_empty() {
        return Err(anyhow!(
            "ocr language(s) not available: {} (available: {})",
            missing.join(", "),
            available.join(", ")
        ));
    }
    if !missing.is_empty() {
        warn!(
            "ocr language(s) not available: {} (available: {})",
            missing.join(", "),
            available.join(", ")
        );
    }
    Ok(chosen.join("+"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> Vec<String> {
        vec!["eng".to_string(), "deu".to_string(), "osd".to_string()]
    }

    #[test]
    fn keeps_installed_languages() {
        assert_eq!(resolve_against("eng+fra, deu", &available()).unwrap(), "eng+deu");
    }

    #[test]
    fn fails_when_nothing_is_installed() {
        let err = resolve_against("fra", &available()).unwrap_err();
        assert!(err.to_string().contains("fra"));
    }

    #[test]
    fn missing_binary_is_unsupported() {
        let engine = TesseractEngine {
            binary: "vin-scan-no-such-tesseract".to_string(),
            languages: "eng".to_string(),
            page_modes: vec![6],
        };
        assert!(!engine.is_supported());
        assert!(engine.list_languages().is_err());
    }
}
