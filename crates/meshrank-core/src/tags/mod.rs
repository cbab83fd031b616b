//! Tag sets and tag selectors.
//!
//! A tag set is the identity of a workload (or the synthetic `{service: name}`
//! of a destination). A selector is a set of per-key clauses: a literal value,
//! or the wildcard `*` meaning "key must be present".

pub mod rank;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};

pub use rank::{pick_highest, SelectorRank};

/// Well-known tag carrying the service name.
pub const SERVICE_TAG: &str = "service";

/// Selector value that matches any value of a present key.
pub const WILDCARD: &str = "*";

/// Flat key -> value labels. Ordered so that iteration and rendering are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(#[serde(deserialize_with = "scalar_tag_map")] BTreeMap<String, String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthetic tag set describing a single destination service.
    pub fn for_service(service: &str) -> Self {
        Self::new().with(SERVICE_TAG, service)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn service(&self) -> Option<&str> {
        self.get(SERVICE_TAG)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pairs(f, self.iter())
    }
}

/// A single per-key clause of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagMatch {
    /// Tag must be present with exactly this value.
    Exact(String),
    /// Tag must be present, any value.
    Any,
}

impl TagMatch {
    pub fn is_satisfied_by(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (_, None) => false,
            (TagMatch::Any, Some(_)) => true,
            (TagMatch::Exact(want), Some(got)) => want == got,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TagMatch::Exact(v) => v,
            TagMatch::Any => WILDCARD,
        }
    }
}

impl From<String> for TagMatch {
    fn from(v: String) -> Self {
        if v == WILDCARD {
            TagMatch::Any
        } else {
            TagMatch::Exact(v)
        }
    }
}

impl From<&str> for TagMatch {
    fn from(v: &str) -> Self {
        TagMatch::from(v.to_string())
    }
}

/// Matcher over a tag set. Written in config as a plain map where `*` is the
/// wildcard, e.g. `{ service: payments, version: "*" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "BTreeMap<String, String>")]
pub struct TagSelector {
    clauses: BTreeMap<String, TagMatch>,
}

impl TagSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause; `"*"` becomes a wildcard.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.insert(key.into(), TagMatch::from(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&TagMatch> {
        self.clauses.get(key)
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagMatch)> {
        self.clauses.iter().map(|(k, m)| (k.as_str(), m))
    }

    /// True iff every clause is satisfied by `tags`. An empty selector matches anything.
    pub fn matches(&self, tags: &TagSet) -> bool {
        self.clauses
            .iter()
            .all(|(key, clause)| clause.is_satisfied_by(tags.get(key)))
    }

    /// Specificity of this selector: literal clauses and wildcard clauses counted separately.
    pub fn rank(&self) -> SelectorRank {
        self.clauses
            .values()
            .fold(SelectorRank::default(), |rank, clause| match clause {
                TagMatch::Exact(_) => rank.combined_with(SelectorRank::new(1, 0)),
                TagMatch::Any => rank.combined_with(SelectorRank::new(0, 1)),
            })
    }

    /// Rank of a successful match, `None` if `tags` does not match.
    pub fn matched_rank(&self, tags: &TagSet) -> Option<SelectorRank> {
        self.matches(tags).then(|| self.rank())
    }

    /// Like [`TagSelector::matched_rank`], but ranking a non-matching pair is an error.
    pub fn rank_for(&self, tags: &TagSet) -> Result<SelectorRank> {
        self.matched_rank(tags)
            .ok_or_else(|| MeshError::InvalidSelectorUse {
                selector: self.to_string(),
                tags: tags.to_string(),
            })
    }
}

impl<'de> Deserialize<'de> for TagSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        scalar_tag_map(deserializer).map(TagSelector::from)
    }
}

impl From<BTreeMap<String, String>> for TagSelector {
    fn from(raw: BTreeMap<String, String>) -> Self {
        Self {
            clauses: raw.into_iter().map(|(k, v)| (k, TagMatch::from(v))).collect(),
        }
    }
}

impl From<TagSelector> for BTreeMap<String, String> {
    fn from(selector: TagSelector) -> Self {
        selector
            .clauses
            .into_iter()
            .map(|(k, m)| {
                let v = m.as_str().to_string();
                (k, v)
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSelector {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |selector, (k, v)| selector.with(k, v))
    }
}

impl fmt::Display for TagSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pairs(f, self.iter().map(|(k, m)| (k, m.as_str())))
    }
}

fn write_pairs<'a>(
    f: &mut fmt::Formatter<'_>,
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
) -> fmt::Result {
    f.write_str("{")?;
    for (i, (k, v)) in pairs.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{k}={v}")?;
    }
    f.write_str("}")
}

/// Tag values are strings, but config authors write `version: 1` or
/// `canary: true` unquoted. Buffered deserialization (internally tagged
/// policies) hands those over as numbers and bools, so every scalar is
/// accepted and rendered as text.
fn scalar_tag_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error> {
    let raw = BTreeMap::<String, TagValue>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, TagValue(v))| (k, v)).collect())
}

struct TagValue(String);

impl<'de> Deserialize<'de> for TagValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TagValueVisitor)
    }
}

struct TagValueVisitor;

impl<'de> Visitor<'de> for TagValueVisitor {
    type Value = TagValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a tag value (string, number or bool)")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<TagValue, E> {
        Ok(TagValue(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<TagValue, E> {
        Ok(TagValue(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<TagValue, E> {
        Ok(TagValue(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<TagValue, E> {
        Ok(TagValue(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<TagValue, E> {
        Ok(TagValue(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<TagValue, E> {
        Ok(TagValue(v.to_string()))
    }
}
