use afccore::channels::{default_ranges, FreqRange};
use afccore::protocol::DEFAULT_RULESET;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Behaviour of the mock AFC engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineScenario {
    /// Seed for the per-request EIRP generator.
    pub seed: u64,
    pub eirp_floor: f64,
    pub eirp_ceiling: f64,
    /// Probability that a channel is reported as excluded (null EIRP).
    pub exclusion_rate: f64,
    /// Attach the `openAfc.mapinfo` extension to successful responses.
    pub include_map: bool,
    pub rulesets: Vec<String>,
    pub denied_serials: Vec<String>,
    pub allowed_ranges: Vec<FreqRange>,
    /// Answer every inquiry with this HTTP status instead of an envelope.
    pub force_status: Option<u16>,
    pub description: Option<String>,
}

impl Default for EngineScenario {
    fn default() -> Self {
        Self {
            seed: 0,
            eirp_floor: 4.0,
            eirp_ceiling: 36.0,
            exclusion_rate: 0.1,
            include_map: true,
            rulesets: vec![DEFAULT_RULESET.into()],
            denied_serials: Vec::new(),
            allowed_ranges: default_ranges(),
            force_status: None,
            description: None,
        }
    }
}

impl EngineScenario {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading engine scenario {}", path_ref.display()))?;
        let scenario: EngineScenario = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing engine scenario {}", path_ref.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.eirp_floor > self.eirp_ceiling {
            anyhow::bail!(
                "eirp_floor {} exceeds eirp_ceiling {}",
                self.eirp_floor,
                self.eirp_ceiling
            );
        }
        if !(0.0..=1.0).contains(&self.exclusion_rate) {
            anyhow::bail!("exclusion_rate {} outside [0, 1]", self.exclusion_rate);
        }
        Ok(())
    }
}
