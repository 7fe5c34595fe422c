//! # Layer Property Bags
//!
//! A [`PropertyBag`] is the flat `key → value` output of a finished selection.
//! It is what a VPF layer is configured from, either handed over directly
//! (see [`crate::layer`]) or printed as `key=value` lines.
//!
//! ## Schema
//!
//! ```text
//! vpfPath=/data/vmaplv0;/data/dnc       paths joined with ';'
//! searchByFeature=true
//! coverageType=bnd trans                 coverages of the selected features
//! featureTypes=area edge                 type categories present
//! area=polbnda                           one list per category
//! edge=roadl
//! polbnda.lineColor=ff000000             style of each feature, prefixed by its name
//! ```
//!
//! Bags keep insertion order, so printing is deterministic.

use crate::error::{Result, VpfError};
use crate::model::FeatureType;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const PATH_PROPERTY: &str = "vpfPath";
pub const SEARCH_BY_FEATURE_PROPERTY: &str = "searchByFeature";
pub const COVERAGE_TYPE_PROPERTY: &str = "coverageType";
pub const FEATURE_TYPES_PROPERTY: &str = "featureTypes";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag {
    entries: IndexMap<String, String>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every entry of `other` under `<prefix>.<key>`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: &PropertyBag) {
        for (k, v) in other.iter() {
            self.insert(format!("{}.{}", prefix, k), v);
        }
    }

    /// Entries under `<prefix>.`, with the prefix removed.
    pub fn strip_prefix(&self, prefix: &str) -> PropertyBag {
        let lead = format!("{}.", prefix);
        let mut bag = PropertyBag::new();
        for (k, v) in self.iter() {
            if let Some(rest) = k.strip_prefix(&lead) {
                bag.insert(rest, v);
            }
        }
        bag
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut bag = PropertyBag::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

/// Join with single spaces; an empty input yields an empty string.
pub fn string_together<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buf = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            buf.push(' ');
        }
        buf.push_str(item.as_ref());
    }
    buf
}

/// Render as `key=value` lines, optionally under a layer marker name.
pub fn to_lines(bag: &PropertyBag, marker: Option<&str>) -> Vec<String> {
    bag.iter()
        .map(|(k, v)| match marker {
            Some(m) if !m.is_empty() => format!("{}.{}={}", m, k, v),
            _ => format!("{}={}", k, v),
        })
        .collect()
}

pub fn write_to<W: Write>(bag: &PropertyBag, marker: Option<&str>, out: &mut W) -> Result<()> {
    for line in to_lines(bag, marker) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

pub fn to_json(bag: &PropertyBag) -> Result<String> {
    Ok(serde_json::to_string_pretty(bag)?)
}

/// Parse `key=value` lines back into a bag.
///
/// Blank lines and `#`/`!` comments are ignored; keys and values are trimmed
/// and split on the first `=`.
pub fn parse_lines(text: &str) -> Result<PropertyBag> {
    let mut bag = PropertyBag::new();
    for (n, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| VpfError::InvalidProperty {
                line: n + 1,
                content: raw.to_string(),
            })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(VpfError::InvalidProperty {
                line: n + 1,
                content: raw.to_string(),
            });
        }
        bag.insert(key, value.trim());
    }
    Ok(bag)
}

/// The selection-level view of a layer bag: which coverages, which type
/// categories, and which features per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    pub coverages: IndexSet<String>,
    pub feature_types: IndexSet<FeatureType>,
    pub features: IndexMap<FeatureType, IndexSet<String>>,
}

impl SelectionSummary {
    pub fn from_bag(bag: &PropertyBag) -> Result<Self> {
        let mut summary = SelectionSummary::default();
        if let Some(v) = bag.get(COVERAGE_TYPE_PROPERTY) {
            summary.coverages = split_list(v).collect();
        }
        if let Some(v) = bag.get(FEATURE_TYPES_PROPERTY) {
            for name in split_list(v) {
                let ft = FeatureType::from_name(&name).ok_or_else(|| {
                    VpfError::Api(format!(
                        "Unknown feature type in {}: {}",
                        FEATURE_TYPES_PROPERTY, name
                    ))
                })?;
                summary.feature_types.insert(ft);
            }
        }
        for ft in &summary.feature_types {
            let names: IndexSet<String> = bag
                .get(ft.name())
                .map(|v| split_list(v).collect())
                .unwrap_or_default();
            summary.features.insert(*ft, names);
        }
        Ok(summary)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value.split_whitespace().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_together_joins_with_single_spaces() {
        assert_eq!(string_together(["a", "b", "c"]), "a b c");
        assert_eq!(string_together(Vec::<String>::new()), "");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut bag = PropertyBag::new();
        bag.insert("a", "1");
        bag.insert("b", "2");
        bag.insert("a", "3");
        let keys: Vec<_> = bag.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(bag.get("a"), Some("3"));
    }

    #[test]
    fn test_lines_with_and_without_marker() {
        let bag: PropertyBag = [("coverageType", "bnd"), ("area", "polbnda")]
            .into_iter()
            .collect();
        assert_eq!(to_lines(&bag, None), vec!["coverageType=bnd", "area=polbnda"]);
        assert_eq!(
            to_lines(&bag, Some("political")),
            vec!["political.coverageType=bnd", "political.area=polbnda"]
        );
    }

    #[test]
    fn test_write_to_emits_one_line_per_entry() {
        let bag: PropertyBag = [("a", "1"), ("b", "")].into_iter().collect();
        let mut out = Vec::new();
        write_to(&bag, None, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a=1\nb=\n");
    }

    #[test]
    fn test_parse_skips_comments_and_splits_on_first_equals() {
        let text = "# generated\n\n! also a comment\nvpfPath = /a;/b\nroad.dash=x=y\nempty=\n";
        let bag = parse_lines(text).unwrap();
        assert_eq!(bag.len(), 3);
        assert_eq!(bag.get("vpfPath"), Some("/a;/b"));
        assert_eq!(bag.get("road.dash"), Some("x=y"));
        assert_eq!(bag.get("empty"), Some(""));
    }

    #[test]
    fn test_parse_rejects_line_without_equals() {
        let err = parse_lines("a=1\nnot a property\n").unwrap_err();
        assert!(matches!(err, VpfError::InvalidProperty { line: 2, .. }));
    }

    #[test]
    fn test_strip_prefix_selects_one_layer() {
        let bag = parse_lines("pol.area=a\npol.edge=b\nroads.edge=c\n").unwrap();
        let pol = bag.strip_prefix("pol");
        assert_eq!(pol.len(), 2);
        assert_eq!(pol.get("edge"), Some("b"));
    }

    #[test]
    fn test_summary_reads_lists() {
        let bag = parse_lines(
            "coverageType=c1 c2\nfeatureTypes=edge point\nedge=road rail\npoint=city\n",
        )
        .unwrap();
        let summary = SelectionSummary::from_bag(&bag).unwrap();
        assert_eq!(summary.coverages.len(), 2);
        assert!(summary.feature_types.contains(&FeatureType::Edge));
        assert_eq!(summary.features[&FeatureType::Edge].len(), 2);
        assert!(summary.features[&FeatureType::Point].contains("city"));
    }

    #[test]
    fn test_summary_rejects_unknown_type() {
        let bag = parse_lines("featureTypes=polygon\n").unwrap();
        assert!(SelectionSummary::from_bag(&bag).is_err());
    }

    #[test]
    fn test_json_keeps_order() {
        let bag: PropertyBag = [("z", "1"), ("a", "2")].into_iter().collect();
        let json = to_json(&bag).unwrap();
        assert!(json.find("\"z\"").unwrap() < json.find("\"a\"").unwrap());
    }
}
