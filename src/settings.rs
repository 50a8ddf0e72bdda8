use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");
pub const ENDPOINT_ENV: &str = "VIN_DECODE_BASE_URL";
pub const DEFAULT_ENDPOINT: &str = "https://vpic.nhtsa.dot.gov/api/vehicles/DecodeVinValues";
pub const DEFAULT_PREFILL_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub ocr: OcrSettings,
    pub prefill: PrefillSettings,
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub binary: String,
    pub languages: String,
    pub page_modes: Vec<u32>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            languages: "eng".to_string(),
            page_modes: vec![6, 11],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrefillSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for PrefillSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_PREFILL_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    ocr: Option<OcrSection>,
    prefill: Option<PrefillSection>,
}

#[derive(Debug, Default, Deserialize)]
struct OcrSection {
    binary: Option<String>,
    languages: Option<String>,
    page_modes: Option<Vec<u32>>,
}

#[derive(Debug, Default, Deserialize)]
struct PrefillSection {
    enabled: Option<bool>,
    endpoint: Option<String>,
    timeout_ms: Option<u64>,
}

/// Merges `settings.toml` and `settings.local.toml` from the working
/// directory and `~/.vin-scan`, then `extra_path`. Later files win.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings
                .merge_toml(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        }
    }

    if let Some(endpoint) = endpoint_from_env() {
        settings.prefill.endpoint = endpoint;
    }

    Ok(settings)
}

pub fn endpoint_from_env() -> Option<String> {
    std::env::var(ENDPOINT_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Settings {
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)?;
        self.merge(parsed);
        Ok(())
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(ocr) = incoming.ocr {
            if let Some(binary) = ocr.binary {
                if !binary.trim().is_empty() {
                    self.ocr.binary = binary;
                }
            }
            if let Some(languages) = ocr.languages {
                if !languages.trim().is_empty() {
                    self.ocr.languages = languages;
                }
            }
            if let Some(modes) = ocr.page_modes {
                if !modes.is_empty() {
                    self.ocr.page_modes = modes;
                }
            }
        }
        if let Some(prefill) = incoming.prefill {
            if let Some(enabled) = prefill.enabled {
                self.prefill.enabled = enabled;
            }
            if let Some(endpoint) = prefill.endpoint {
                if !endpoint.trim().is_empty() {
                    self.prefill.endpoint = endpoint;
                }
            }
            if let Some(timeout_ms) = prefill.timeout_ms {
                if timeout_ms > 0 {
                    self.prefill.timeout = Duration::from_millis(timeout_ms);
                }
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".vin-scan"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{with_isolated_env, with_temp_home};

    #[test]
    fn embedded_defaults_match_default_impl() {
        let mut settings = Settings::default();
        settings.merge_toml(DEFAULT_SETTINGS_TOML).unwrap();
        let defaults = Settings::default();
        assert_eq!(settings.ocr.binary, defaults.ocr.binary);
        assert_eq!(settings.ocr.languages, defaults.ocr.languages);
        assert_eq!(settings.ocr.page_modes, defaults.ocr.page_modes);
        assert_eq!(settings.prefill.enabled, defaults.prefill.enabled);
        assert_eq!(settings.prefill.endpoint, defaults.prefill.endpoint);
        assert_eq!(settings.prefill.timeout, DEFAULT_PREFILL_TIMEOUT);
    }

    #[test]
    fn partial_sections_keep_other_values() {
        let mut settings = Settings::default();
        settings
            .merge_toml("[prefill]\ntimeout_ms = 250\nendpoint = \"  \"\n")
            .unwrap();
        assert_eq!(settings.prefill.timeout, Duration::from_millis(250));
        assert_eq!(settings.prefill.endpoint, DEFAULT_ENDPOINT);
        assert!(settings.prefill.enabled);
        assert_eq!(settings.ocr.languages, "eng");
    }

    #[test]
    fn extra_settings_file_is_applied_last() {
        with_temp_home(|home| {
            let extra = home.join("extra.toml");
            fs::write(&extra, "[prefill]\nenabled = false\n[ocr]\npage_modes = [7]\n").unwrap();
            let settings = load_settings(Some(&extra)).unwrap();
            assert!(!settings.prefill.enabled);
            assert_eq!(settings.ocr.page_modes, vec![7]);
            assert!(home.join(".vin-scan").join("settings.toml").exists());
        });
    }

    #[test]
    fn missing_extra_settings_file_is_an_error() {
        with_temp_home(|home| {
            let err = load_settings(Some(&home.join("missing.toml"))).unwrap_err();
            assert!(err.to_string().contains("settings file not found"));
        });
    }

    #[test]
    fn environment_endpoint_overrides_files() {
        with_isolated_env(Some(" http://127.0.0.1:8080/decode "), |home| {
            let extra = home.join("extra.toml");
            fs::write(&extra, "[prefill]\nendpoint = \"http://example.invalid\"\n").unwrap();
            let settings = load_settings(Some(&extra)).unwrap();
            assert_eq!(settings.prefill.endpoint, "http://127.0.0.1:8080/decode");
        });
    }

    #[test]
    fn blank_environment_endpoint_is_ignored() {
        with_isolated_env(Some("   "), |_| {
            assert_eq!(endpoint_from_env(), None);
        });
    }
}
