//! Cleaning of source vendor comments before they are translated.

use tracing::debug;

use super::error::TagNormalizeError;
use super::TagMap;

/// Keys starting with this prefix (volume normalization) are dropped.
pub const NORMALIZATION_PREFIX: &str = "replaygain";

/// Keys dropped outright (encoder identification).
pub const DROPPED_TAGS: &[&str] = &["encoder"];

/// A number tag and the keys that may carry its total.
struct MergeGroup {
    primary: &'static str,
    totals: &'static [&'static str],
}

const MERGE_GROUPS: [MergeGroup; 2] = [
    MergeGroup {
        primary: "tracknumber",
        totals: &["tracktotal", "totaltracks", "total tracks"],
    },
    MergeGroup {
        primary: "discnumber",
        totals: &["disctotal", "totaldiscs", "total discs"],
    },
];

/// Returns a cleaned copy of `raw`.
///
/// Normalization and encoder tags are removed and every total key is folded
/// into its number tag as `N/total`. The result never contains a total key.
pub fn normalize_tags(raw: &TagMap) -> Result<TagMap, TagNormalizeError> {
    let mut tags: TagMap = raw
        .iter()
        .filter(|(key, _)| {
            !key.starts_with(NORMALIZATION_PREFIX) && !DROPPED_TAGS.contains(&key.as_str())
        })
        .map(|(key, values)| (key.clone(), values.clone()))
        .collect();

    for group in &MERGE_GROUPS {
        merge_total(&mut tags, group)?;
    }

    Ok(tags)
}

fn merge_total(tags: &mut TagMap, group: &MergeGroup) -> Result<(), TagNormalizeError> {
    let present: Vec<&'static str> = group
        .totals
        .iter()
        .copied()
        .filter(|key| tags.contains_key(*key))
        .collect();

    let has_number = tags
        .get(group.primary)
        .is_some_and(|values| !values.is_empty());

    if !has_number {
        // Nothing to attach a total to.
        for key in &present {
            tags.remove(*key);
        }
        return Ok(());
    }
    if present.is_empty() {
        return Ok(());
    }

    let mut totals = Vec::with_capacity(present.len());
    for key in &present {
        let value = tags
            .get(*key)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or_default();
        let total = value
            .trim()
            .parse::<u32>()
            .map_err(|_| TagNormalizeError::InvalidTotal {
                key: key.to_string(),
                value: value.to_string(),
            })?;
        totals.push(total);
    }

    if totals.windows(2).any(|pair| pair[0] != pair[1]) {
        return Err(TagNormalizeError::ConflictingTotals {
            keys: present.iter().map(|key| key.to_string()).collect(),
        });
    }

    for key in &present {
        tags.remove(*key);
    }
    if let Some(number) = tags
        .get_mut(group.primary)
        .and_then(|values| values.first_mut())
    {
        *number = format!("{}/{}", number, totals[0]);
        debug!(tag = group.primary, value = %number, "Merged total into number tag");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &[&str])]) -> TagMap {
        entries
            .iter()
            .map(|(key, values)| {
                (
                    key.to_string(),
                    values.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_merges_track_total() {
        let raw = map(&[("tracknumber", &["3"]), ("tracktotal", &["12"])]);
        let tags = normalize_tags(&raw).unwrap();
        assert_eq!(tags, map(&[("tracknumber", &["3/12"])]));
    }

    #[test]
    fn test_agreeing_synonyms_merge() {
        let raw = map(&[
            ("discnumber", &["1"]),
            ("disctotal", &["2"]),
            ("totaldiscs", &["02"]),
        ]);
        let tags = normalize_tags(&raw).unwrap();
        assert_eq!(tags, map(&[("discnumber", &["1/2"])]));
    }

    #[test]
    fn test_conflicting_totals() {
        let raw = map(&[
            ("tracknumber", &["3"]),
            ("tracktotal", &["12"]),
            ("totaltracks", &["11"]),
        ]);
        let err = normalize_tags(&raw).unwrap_err();
        match &err {
            TagNormalizeError::ConflictingTotals { keys } => {
                assert!(keys.contains(&"tracktotal".to_string()));
                assert!(keys.contains(&"totaltracks".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("tracktotal"));
        assert!(err.to_string().contains("totaltracks"));
    }

    #[test]
    fn test_drops_normalization_and_encoder_tags() {
        let raw = map(&[
            ("replaygain_track_gain", &["-3 dB"]),
            ("encoder", &["x"]),
            ("title", &["t"]),
        ]);
        let tags = normalize_tags(&raw).unwrap();
        assert_eq!(tags, map(&[("title", &["t"])]));
    }

    #[test]
    fn test_bare_number_is_untouched() {
        let raw = map(&[("tracknumber", &["7"]), ("artist", &["A", "B"])]);
        let tags = normalize_tags(&raw).unwrap();
        assert_eq!(tags, raw);
    }

    #[test]
    fn test_total_without_number_is_dropped() {
        let raw = map(&[("tracktotal", &["12"]), ("title", &["t"])]);
        let tags = normalize_tags(&raw).unwrap();
        assert_eq!(tags, map(&[("title", &["t"])]));
    }

    #[test]
    fn test_non_numeric_total() {
        let raw = map(&[("tracknumber", &["1"]), ("total tracks", &["twelve"])]);
        let err = normalize_tags(&raw).unwrap_err();
        assert_eq!(
            err,
            TagNormalizeError::InvalidTotal {
                key: "total tracks".to_string(),
                value: "twelve".to_string(),
            }
        );
    }

    #[test]
    fn test_input_is_not_modified() {
        let raw = map(&[("tracknumber", &["3"]), ("tracktotal", &["12"])]);
        let before = raw.clone();
        let _ = normalize_tags(&raw).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn test_only_first_number_value_gets_total() {
        let raw = map(&[("tracknumber", &["3", "4"]), ("tracktotal", &["9"])]);
        let tags = normalize_tags(&raw).unwrap();
        assert_eq!(tags["tracknumber"], vec!["3/9".to_string(), "4".to_string()]);
    }
}
