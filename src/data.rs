use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Category assigned to items whose `category` is absent or blank.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Item {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub domains: Vec<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub popular: bool,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub status: Option<String>,
}

impl Item {
    /// The grouping key: the category, or [`UNCATEGORIZED`] when unset.
    pub fn category_key(&self) -> &str {
        non_empty(&self.category).unwrap_or(UNCATEGORIZED)
    }

    pub fn sector(&self) -> Option<&str> {
        non_empty(&self.sector)
    }

    pub fn country(&self) -> Option<&str> {
        non_empty(&self.country)
    }

    pub fn owner(&self) -> Option<&str> {
        non_empty(&self.owner)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    /// First listed domain, used by the domain sort and sub-grouping.
    pub fn primary_domain(&self) -> Option<&str> {
        self.domains
            .iter()
            .map(|d| d.as_str())
            .find(|d| !d.trim().is_empty())
    }

    pub fn is_inactive(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("inactive"))
    }

    /// Text the free-text filter searches: name and description.
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.name,
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_string(Value::deserialize(d)?))
}

fn lenient_string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let list = match Value::deserialize(d)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(value_to_string)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    };
    Ok(list)
}

fn lenient_year<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let year = match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(year)
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Item {
        serde_json::from_str(json).expect("item should decode")
    }

    #[test]
    fn test_minimal_item_defaults() {
        let item = parse(r#"{"name": "Alpha"}"#);
        assert_eq!(item.name, "Alpha");
        assert_eq!(item.category_key(), UNCATEGORIZED);
        assert!(item.domains.is_empty());
        assert!(!item.popular);
        assert_eq!(item.year, None);
    }

    #[test]
    fn test_empty_object_still_decodes() {
        let item = parse("{}");
        assert_eq!(item.name, "");
        assert!(item.url.is_none());
    }

    #[test]
    fn test_wrong_types_degrade() {
        let item = parse(
            r#"{"name": 42, "category": null, "domains": "AI", "year": "2019",
                "popular": "yes", "country": ["x"], "extra": {"ignored": true}}"#,
        );
        assert_eq!(item.name, "42");
        assert_eq!(item.category, None);
        assert_eq!(item.domains, vec!["AI".to_string()]);
        assert_eq!(item.year, Some(2019));
        assert!(!item.popular, "only JSON true marks an item popular");
        assert_eq!(item.country, None);
    }

    #[test]
    fn test_blank_category_is_uncategorized() {
        let item = parse(r#"{"name": "A", "category": "   "}"#);
        assert_eq!(item.category_key(), UNCATEGORIZED);
    }

    #[test]
    fn test_primary_domain_skips_blank() {
        let item = parse(r#"{"name": "A", "domains": ["", "Cloud", "AI"]}"#);
        assert_eq!(item.primary_domain(), Some("Cloud"));
    }

    #[test]
    fn test_search_text_lowercases_name_and_description() {
        let item = parse(r#"{"name": "Zeta", "description": "Vector DB"}"#);
        assert_eq!(item.search_text(), "zeta vector db");
    }

    #[test]
    fn test_inactive_status() {
        assert!(parse(r#"{"status": "Inactive"}"#).is_inactive());
        assert!(!parse(r#"{"status": "active"}"#).is_inactive());
    }
}
