use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Category vocabulary used when comparing two preference sets.
pub const CATEGORIES: [&str; 6] = ["movies", "music", "books", "food", "travel", "hobbies"];

/// How long a cached recommendation record is advertised as valid.
pub const RECORD_LIFETIME_DAYS: i64 = 7;

/// A user's category -> interests mapping.
///
/// Deserialization is lenient: a category whose value is not an array is
/// read as empty and non-string entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PreferenceSet(BTreeMap<String, BTreeSet<String>>);

impl PreferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category<I, S>(mut self, category: &str, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(category, interests);
        self
    }

    pub fn insert<I, S>(&mut self, category: &str, interests: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(category.to_string())
            .or_default()
            .extend(interests.into_iter().map(Into::<String>::into));
    }

    pub fn interests(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.0.get(category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    pub fn from_value(value: &serde_json::Value) -> Self {
        let mut categories = BTreeMap::new();

        if let Some(object) = value.as_object() {
            for (category, interests) in object {
                let set: BTreeSet<String> = interests
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|item| item.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                categories.insert(category.clone(), set);
            }
        }

        Self(categories)
    }
}

impl<'de> Deserialize<'de> for PreferenceSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RecommendationItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Display title: `name`, then a `title` field, if either is non-empty.
    pub fn title(&self) -> Option<&str> {
        if !self.name.is_empty() {
            return Some(&self.name);
        }
        self.extra
            .get("title")
            .and_then(|title| title.as_str())
            .filter(|title| !title.is_empty())
    }
}

/// Response body of the recommendation endpoint and the value served to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationPayload {
    #[serde(default)]
    pub recommendations: Vec<RecommendationItem>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub archetype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedRecommendationRecord {
    pub recommendations: Vec<RecommendationItem>,
    pub category: String,
    pub archetype: String,
    pub week_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedRecommendationRecord {
    pub fn new(payload: &RecommendationPayload, week_id: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            recommendations: payload.recommendations.clone(),
            category: payload.category.clone(),
            archetype: payload.archetype.clone(),
            week_id: week_id.to_string(),
            created_at,
            expires_at: created_at + Duration::days(RECORD_LIFETIME_DAYS),
        }
    }

    pub fn into_payload(self) -> RecommendationPayload {
        RecommendationPayload {
            recommendations: self.recommendations,
            category: self.category,
            archetype: self.archetype,
        }
    }
}

/// Another user considered for matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub preferences: Option<PreferenceSet>,
}

impl CandidateProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            archetype: None,
            preferences: None,
        }
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    pub fn with_preferences(mut self, preferences: PreferenceSet) -> Self {
        self.preferences = Some(preferences);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteMatch {
    pub id: String,
    pub name: String,
    pub archetype: Option<String>,
    pub similarity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollItem {
    pub id: String,
    pub title: String,
    pub image: String,
}

/// Per-item like counts for one weekly poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeTally {
    #[serde(default)]
    pub item1: i64,
    #[serde(default)]
    pub item2: i64,
    #[serde(default)]
    pub item3: i64,
    #[serde(default)]
    pub item4: i64,
    #[serde(default)]
    pub item5: i64,
    #[serde(default)]
    pub week_id: String,
    #[serde(default)]
    pub archetype: String,
    #[serde(default)]
    pub category: String,
}

impl LikeTally {
    pub const ITEM_IDS: [&'static str; 5] = ["item1", "item2", "item3", "item4", "item5"];

    pub fn count(&self, item_id: &str) -> Option<i64> {
        match item_id {
            "item1" => Some(self.item1),
            "item2" => Some(self.item2),
            "item3" => Some(self.item3),
            "item4" => Some(self.item4),
            "item5" => Some(self.item5),
            _ => None,
        }
    }

    pub fn add(&mut self, item_id: &str, delta: i64) -> bool {
        let slot = match item_id {
            "item1" => &mut self.item1,
            "item2" => &mut self.item2,
            "item3" => &mut self.item3,
            "item4" => &mut self.item4,
            "item5" => &mut self.item5,
            _ => return false,
        };
        *slot += delta;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preferences_parse_leniently() {
        let prefs: PreferenceSet = serde_json::from_value(json!({
            "movies": ["A", "B", "A"],
            "music": "not a list",
            "books": [1, "Dune", null],
        }))
        .unwrap();

        assert_eq!(prefs.interests("movies").unwrap().len(), 2);
        assert!(prefs.interests("music").unwrap().is_empty());
        let books: Vec<_> = prefs.interests("books").unwrap().iter().cloned().collect();
        assert_eq!(books, vec!["Dune".to_string()]);
    }

    #[test]
    fn test_non_object_preferences_are_empty() {
        let prefs = PreferenceSet::from_value(&json!(["movies"]));
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_record_uses_camel_case_and_week_lifetime() {
        let payload = RecommendationPayload {
            recommendations: vec![RecommendationItem::new("Heat")],
            category: "movies".to_string(),
            archetype: "Night Owl".to_string(),
        };
        let created = Utc::now();
        let record = CachedRecommendationRecord::new(&payload, "2024-W10", created);
        assert_eq!(record.expires_at - record.created_at, Duration::days(7));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["weekId"], "2024-W10");
        assert!(value.get("createdAt").is_some());
        assert_eq!(record.into_payload(), payload);
    }

    #[test]
    fn test_item_extra_fields_survive() {
        let item: RecommendationItem =
            serde_json::from_value(json!({"name": "Heat", "year": 1995})).unwrap();
        assert_eq!(item.extra["year"], 1995);
        assert_eq!(item.title(), Some("Heat"));

        let titled: RecommendationItem = serde_json::from_value(json!({"title": "Dune"})).unwrap();
        assert_eq!(titled.title(), Some("Dune"));
    }
}
