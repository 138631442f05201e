use serde::{Deserialize, Serialize};

/// Display colour derived from a channel's EIRP limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelColor {
    /// No result received for this channel.
    #[default]
    NoData,
    /// Result received without an EIRP value (regulatory exclusion).
    Black,
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub name: String,
    pub max_eirp: Option<f64>,
    pub color: ChannelColor,
}

impl Channel {
    fn unset(cfi: u32) -> Self {
        Self {
            name: cfi.to_string(),
            max_eirp: None,
            color: ChannelColor::NoData,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelGroup {
    pub operating_class: u32,
    pub channel_width_mhz: u32,
    pub channels: Vec<Channel>,
}

/// Operating classes of the US 6 GHz band: (class, width, first cfi, step, count).
const OPERATING_CLASSES: [(u32, u32, u32, u32, u32); 5] = [
    (131, 20, 1, 4, 59),
    (132, 40, 3, 8, 29),
    (133, 80, 7, 16, 14),
    (134, 160, 15, 32, 7),
    (136, 20, 2, 0, 1),
];

/// Channel centre indices of an operating class, empty when unknown.
pub fn operating_class_channels(operating_class: u32) -> Vec<u32> {
    OPERATING_CLASSES
        .iter()
        .find(|(class, ..)| *class == operating_class)
        .map(|&(_, _, first, step, count)| (0..count).map(|k| first + k * step).collect())
        .unwrap_or_default()
}

/// The canonical taxonomy with every channel unset.
pub fn empty_channels() -> Vec<ChannelGroup> {
    OPERATING_CLASSES
        .iter()
        .map(|&(operating_class, channel_width_mhz, ..)| ChannelGroup {
            operating_class,
            channel_width_mhz,
            channels: operating_class_channels(operating_class)
                .into_iter()
                .map(Channel::unset)
                .collect(),
        })
        .collect()
}

/// Frequency band an operator may inquire about, in MHz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreqRange {
    pub name: String,
    #[serde(rename = "startFreqMHz")]
    pub start_freq_mhz: u64,
    #[serde(rename = "stopFreqMHz")]
    pub stop_freq_mhz: u64,
}

impl FreqRange {
    pub fn contains(&self, low_hz: u64, high_hz: u64) -> bool {
        low_hz >= self.start_freq_mhz * 1_000_000 && high_hz <= self.stop_freq_mhz * 1_000_000
    }
}

/// UNII-5 and UNII-7, used when no allowed ranges are configured.
pub fn default_ranges() -> Vec<FreqRange> {
    vec![
        FreqRange {
            name: "UNII-5".into(),
            start_freq_mhz: 5925,
            stop_freq_mhz: 6425,
        },
        FreqRange {
            name: "UNII-7".into(),
            start_freq_mhz: 6525,
            stop_freq_mhz: 6875,
        },
    ]
}
