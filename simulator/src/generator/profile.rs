use crate::workflow::config::EngineScenario;
use afccore::channels::operating_class_channels;
use afccore::protocol::{
    AvailableChannelInfo, AvailableFrequencyInfo, FrequencyRange, InquiredChannel,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Operating classes answered when an inquiry names none.
const DEFAULT_CLASSES: [u32; 4] = [131, 132, 133, 134];

/// Offset between channel EIRP and PSD for a 20 MHz reference bandwidth.
const PSD_OFFSET_DB: f64 = 13.0;

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Seeded source of synthetic EIRP limits.
pub struct EirpGenerator {
    rng: StdRng,
    floor: f64,
    ceiling: f64,
    exclusion_rate: f64,
}

impl EirpGenerator {
    pub fn new(scenario: &EngineScenario) -> Self {
        Self {
            rng: StdRng::seed_from_u64(scenario.seed),
            floor: scenario.eirp_floor,
            ceiling: scenario.eirp_ceiling.max(scenario.eirp_floor),
            exclusion_rate: scenario.exclusion_rate.clamp(0.0, 1.0),
        }
    }

    fn level(&mut self) -> f64 {
        if self.ceiling > self.floor {
            round_tenth(self.rng.gen_range(self.floor..self.ceiling))
        } else {
            self.floor
        }
    }

    fn channel_eirp(&mut self) -> Option<f64> {
        if self.exclusion_rate > 0.0 && self.rng.gen_bool(self.exclusion_rate) {
            None
        } else {
            Some(self.level())
        }
    }

    /// One result per inquired class; classes without explicit channels get
    /// every channel of the class.
    pub fn channel_info(&mut self, inquired: &[InquiredChannel]) -> Vec<AvailableChannelInfo> {
        let classes: Vec<InquiredChannel> = if inquired.is_empty() {
            DEFAULT_CLASSES
                .iter()
                .map(|&class| InquiredChannel {
                    global_operating_class: class,
                    channel_cfi: None,
                })
                .collect()
        } else {
            inquired.to_vec()
        };

        classes
            .into_iter()
            .map(|class| {
                let channel_cfi = class
                    .channel_cfi
                    .unwrap_or_else(|| operating_class_channels(class.global_operating_class));
                let max_eirp = channel_cfi.iter().map(|_| self.channel_eirp()).collect();
                AvailableChannelInfo {
                    global_operating_class: class.global_operating_class,
                    channel_cfi,
                    max_eirp,
                }
            })
            .collect()
    }

    pub fn frequency_info(&mut self, ranges: &[FrequencyRange]) -> Vec<AvailableFrequencyInfo> {
        ranges
            .iter()
            .map(|range| AvailableFrequencyInfo {
                frequency_range: *range,
                max_psd: Some(round_tenth(self.level() - PSD_OFFSET_DB)),
            })
            .collect()
    }
}
