mod tracker;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::settings::{self, PrefillSettings};
use crate::vin::{VIN_LENGTH, detect_likely_make_from_vin, normalize_vin};

pub use tracker::{PrefillTicket, PrefillTracker};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakeModel {
    pub make: String,
    pub model: String,
}

/// Best-effort make/model for a VIN: the local WMI guess, upgraded by the
/// remote decode service for full VINs. Never fails.
#[derive(Debug, Clone)]
pub struct Prefiller {
    client: reqwest::Client,
    settings: PrefillSettings,
}

impl Prefiller {
    pub fn new(settings: &PrefillSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings: settings.clone(),
        }
    }

    pub async fn prefill(&self, vin: &str) -> MakeModel {
        let normalized = normalize_vin(vin);
        let local = MakeModel {
            make: detect_likely_make_from_vin(&normalized),
            model: String::new(),
        };
        if normalized.len() != VIN_LENGTH || !self.settings.enabled {
            return local;
        }

        match timeout(self.settings.timeout, self.fetch_remote(&normalized)).await {
            Ok(Ok(remote)) => merge_remote(local, remote),
            Ok(Err(err)) => {
                warn!("VIN decode lookup failed for {}: {:#}", normalized, err);
                local
            }
            Err(_) => {
                warn!(
                    "VIN decode lookup for {} timed out after {}ms",
                    normalized,
                    self.settings.timeout.as_millis()
                );
                local
            }
        }
    }

    /// Like [`Prefiller::prefill`], but `None` when the tracker skips the
    /// VIN or a newer lookup started while this one was in flight.
    pub async fn prefill_tracked(
        &self,
        tracker: &PrefillTracker,
        vin: &str,
    ) -> Option<MakeModel> {
        let ticket = tracker.begin(vin)?;
        let result = self.prefill(&ticket.vin).await;
        if !tracker.is_current(ticket.seq) {
            debug!("discarding stale prefill #{} for {}", ticket.seq, ticket.vin);
            return None;
        }
        Some(result)
    }

    async fn fetch_remote(&self, vin: &str) -> Result<RemoteMakeModel> {
        let url = format!(
            "{}/{}?format=json",
            self.settings.endpoint.trim_end_matches('/'),
            vin
        );
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| "VIN decode request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("VIN decode API error ({})", status));
        }
        let body = response
            .text()
            .await
            .with_context(|| "failed to read VIN decode response")?;
        parse_decode_response(&body)
    }
}

/// [`Prefiller::prefill`] with default settings and the endpoint override
/// from the environment.
pub async fn prefill_make_model_from_vin(vin: &str) -> MakeModel {
    let mut prefill = PrefillSettings::default();
    if let Some(endpoint) = settings::endpoint_from_env() {
        prefill.endpoint = endpoint;
    }
    Prefiller::new(&prefill).prefill(vin).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RemoteMakeModel {
    make: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct DecodeResponse {
    #[serde(rename = "Results", default)]
    results: Vec<DecodeResult>,
}

#[derive(Debug, Deserialize)]
struct DecodeResult {
    #[serde(rename = "Make", default)]
    make: Option<String>,
    #[serde(rename = "Model", default)]
    model: Option<String>,
}

fn parse_decode_response(body: &str) -> Result<RemoteMakeModel> {
    let payload: DecodeResponse =
        serde_json::from_str(body).with_context(|| "failed to parse VIN decode response")?;
    payload
        .results
        .into_iter()
        .map(|result| RemoteMakeModel {
            make: title_case(result.make.as_deref().unwrap_or_default()),
            model: title_case(result.model.as_deref().unwrap_or_default()),
        })
        .find(|remote| !remote.make.is_empty() || !remote.model.is_empty())
        .ok_or_else(|| anyhow!("VIN decode response has no make or model"))
}

fn merge_remote(local: MakeModel, remote: RemoteMakeModel) -> MakeModel {
    MakeModel {
        make: if remote.make.is_empty() {
            local.make
        } else {
            remote.make
        },
        model: remote.model,
    }
}

fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut word_start = true;
    for ch in value.trim().chars() {
        if ch.is_alphanumeric() {
            if word_start {
                output.extend(ch.to_uppercase());
            } else {
                output.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            output.push(ch);
            word_start = true;
        }
    }
    output
}
