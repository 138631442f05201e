use super::taxonomy::{empty_channels, ChannelColor, ChannelGroup};
use crate::protocol::AvailableChannelInfo;

/// Colour rule for one channel. A missing value is an exclusion and wins
/// over any threshold comparison.
pub fn channel_color(max_eirp: Option<f64>, min_eirp: f64, max_threshold: f64) -> ChannelColor {
    match max_eirp {
        None => ChannelColor::Black,
        Some(eirp) if eirp >= max_threshold => ChannelColor::Green,
        Some(eirp) if eirp >= min_eirp => ChannelColor::Yellow,
        Some(_) => ChannelColor::Red,
    }
}

/// Maps per-class EIRP results onto the full channel taxonomy.
///
/// Channels are matched by their textual centre index across every group.
/// Entries missing from a short `maxEirp` array count as excluded.
pub fn classify_channels(
    results: &[AvailableChannelInfo],
    min_eirp: f64,
    max_eirp: f64,
) -> Vec<ChannelGroup> {
    let mut groups = empty_channels();
    for result in results {
        for (index, cfi) in result.channel_cfi.iter().enumerate() {
            let name = cfi.to_string();
            let value = result.max_eirp.get(index).copied().flatten();
            for channel in groups
                .iter_mut()
                .flat_map(|group| group.channels.iter_mut())
                .filter(|channel| channel.name == name)
            {
                channel.max_eirp = value;
                channel.color = channel_color(value, min_eirp, max_eirp);
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::Channel;

    fn find<'a>(groups: &'a [ChannelGroup], name: &str) -> &'a Channel {
        groups
            .iter()
            .flat_map(|g| g.channels.iter())
            .find(|c| c.name == name)
            .unwrap()
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(channel_color(Some(30.0), 15.0, 30.0), ChannelColor::Green);
        assert_eq!(channel_color(Some(15.0), 15.0, 30.0), ChannelColor::Yellow);
        assert_eq!(channel_color(Some(14.9), 15.0, 30.0), ChannelColor::Red);
    }

    #[test]
    fn null_eirp_is_black_for_any_thresholds() {
        for (min, max) in [(0.0, 0.0), (-100.0, 100.0), (50.0, -50.0)] {
            assert_eq!(channel_color(None, min, max), ChannelColor::Black);
        }
    }

    #[test]
    fn classification_colours_reported_channels_only() {
        let results = vec![AvailableChannelInfo {
            global_operating_class: 133,
            channel_cfi: vec![7, 23, 39],
            max_eirp: vec![Some(32.0), Some(20.0)],
        }];
        let groups = classify_channels(&results, 15.0, 30.0);

        assert_eq!(find(&groups, "7").color, ChannelColor::Green);
        assert_eq!(find(&groups, "23").color, ChannelColor::Yellow);
        assert_eq!(find(&groups, "39").color, ChannelColor::Black);
        assert_eq!(find(&groups, "55").color, ChannelColor::NoData);
        assert_eq!(find(&groups, "55").max_eirp, None);
    }

    #[test]
    fn unknown_identifiers_leave_taxonomy_untouched() {
        let results = vec![AvailableChannelInfo {
            global_operating_class: 999,
            channel_cfi: vec![4000],
            max_eirp: vec![Some(36.0)],
        }];
        assert_eq!(classify_channels(&results, 15.0, 30.0), empty_channels());
    }

    #[test]
    fn later_results_override_earlier_ones() {
        let results = vec![
            AvailableChannelInfo {
                global_operating_class: 131,
                channel_cfi: vec![1],
                max_eirp: vec![Some(10.0)],
            },
            AvailableChannelInfo {
                global_operating_class: 131,
                channel_cfi: vec![1],
                max_eirp: vec![None],
            },
        ];
        let groups = classify_channels(&results, 15.0, 30.0);
        assert_eq!(find(&groups, "1").color, ChannelColor::Black);
    }
}
