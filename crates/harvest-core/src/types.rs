//! Data model shared by the pipeline stages.
//!
//! Stages never hand these to each other in memory; they are the shapes of
//! the JSON artifacts each stage persists.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered mapping from 1-based ordinal to item URL.
///
/// Ordinals are assigned in insertion order with no gaps. The JSON form is an
/// object keyed by the string ordinal, written in ordinal order (never sorted
/// lexicographically, so `"10"` follows `"9"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlIndex {
    urls: Vec<String>,
}

impl UrlIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a URL and return the ordinal it was assigned.
    pub fn push(&mut self, url: impl Into<String>) -> usize {
        self.urls.push(url.into());
        self.urls.len()
    }

    /// URL at a 1-based ordinal.
    #[must_use]
    pub fn get(&self, ordinal: usize) -> Option<&str> {
        ordinal
            .checked_sub(1)
            .and_then(|i| self.urls.get(i))
            .map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether the index holds no URLs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// `(ordinal, url)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.urls
            .iter()
            .enumerate()
            .map(|(i, url)| (i + 1, url.as_str()))
    }
}

impl<S: Into<String>> FromIterator<S> for UrlIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Serialize for UrlIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.urls.len()))?;
        for (ordinal, url) in self.iter() {
            map.serialize_entry(&ordinal.to_string(), url)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UrlIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(UrlIndexVisitor)
    }
}

struct UrlIndexVisitor;

impl<'de> Visitor<'de> for UrlIndexVisitor {
    type Value = UrlIndex;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping sequential 1-based ordinals to URLs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<UrlIndex, A::Error> {
        let mut index = UrlIndex::new();
        while let Some((key, url)) = access.next_entry::<String, String>()? {
            let expected = index.len() + 1;
            match key.parse::<usize>() {
                Ok(ordinal) if ordinal == expected => {
                    index.push(url);
                }
                _ => {
                    return Err(serde::de::Error::custom(format!(
                        "expected ordinal {expected}, found key '{key}'"
                    )));
                }
            }
        }
        Ok(index)
    }
}

/// One enriched listing.
///
/// Every field except `url` is independently optional: a field that could
/// not be extracted is `None` without affecting its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Listing name
    #[serde(rename = "item_name")]
    pub name: Option<String>,
    /// Item page URL, copied from the index
    #[serde(rename = "item_url")]
    pub url: String,
    /// Phone numbers with the `tel:` scheme stripped
    #[serde(rename = "item_phones_list")]
    pub phones: Option<Vec<String>>,
    /// Street address
    #[serde(rename = "item_address")]
    pub address: Option<String>,
    /// Website as displayed on the page
    #[serde(rename = "item_site")]
    pub site: Option<String>,
    /// Decoded social network URLs
    #[serde(rename = "social_networks_list")]
    pub social_networks: Option<Vec<String>>,
}

impl ItemRecord {
    /// A record carrying only its URL, used when the page could not be fetched.
    #[must_use]
    pub fn unfetched(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}
