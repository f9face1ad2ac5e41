use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordering requested from the search service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    Date,
    Popularity,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::Date => "date",
            SortMode::Popularity => "popularity",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub date_range: Option<DateRange>,
    pub tags: Vec<String>,
    pub sources: Vec<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.date_range
            .as_ref()
            .map_or(true, |r| r.from.is_none() && r.to.is_none())
            && self.tags.is_empty()
            && self.sources.is_empty()
    }
}

/// One search invocation. Built fresh for every request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub filters: SearchFilters,
    pub sort: SortMode,
    pub num_results: u32,
}

impl SearchQuery {
    /// Query-string pairs for `GET /api/search`. Tags and sources repeat their key.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", self.text.trim().to_string()),
            ("num_results", self.num_results.to_string()),
        ];
        if self.sort != SortMode::Relevance {
            params.push(("sort", self.sort.as_str().to_string()));
        }
        if let Some(range) = &self.filters.date_range {
            if let Some(from) = range.from {
                params.push(("dateFrom", from.format("%Y-%m-%d").to_string()));
            }
            if let Some(to) = range.to {
                params.push(("dateTo", to.format("%Y-%m-%d").to_string()));
            }
        }
        for tag in &self.filters.tags {
            params.push(("tag", tag.clone()));
        }
        for source in &self.filters.sources {
            params.push(("source", source.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(text: &str) -> SearchQuery {
        SearchQuery {
            text: text.to_string(),
            filters: SearchFilters::default(),
            sort: SortMode::default(),
            num_results: 20,
        }
    }

    #[test]
    fn test_plain_query_params_carry_text_and_bound_only() {
        let params = query("  rust engineer ").to_params();
        assert_eq!(
            params,
            vec![
                ("query", "rust engineer".to_string()),
                ("num_results", "20".to_string())
            ]
        );
    }

    #[test]
    fn test_filters_and_sort_expand_to_repeated_params() {
        let mut q = query("designer");
        q.sort = SortMode::Date;
        q.filters = SearchFilters {
            date_range: Some(DateRange {
                from: NaiveDate::from_ymd_opt(2024, 5, 1),
                to: None,
            }),
            tags: vec!["Technology".to_string(), "Health".to_string()],
            sources: vec!["News".to_string()],
        };

        let params = q.to_params();
        assert!(params.contains(&("sort", "date".to_string())));
        assert!(params.contains(&("dateFrom", "2024-05-01".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "dateTo"));
        assert_eq!(params.iter().filter(|(k, _)| *k == "tag").count(), 2);
        assert!(params.contains(&("source", "News".to_string())));
    }

    #[test]
    fn test_sort_mode_serde_is_lowercase() {
        let sort: SortMode = serde_json::from_str(r#""popularity""#).unwrap();
        assert_eq!(sort, SortMode::Popularity);
        assert_eq!(SortMode::default(), SortMode::Relevance);
    }

    #[test]
    fn test_filters_with_blank_range_are_empty() {
        let filters = SearchFilters {
            date_range: Some(DateRange::default()),
            ..Default::default()
        };
        assert!(filters.is_empty());
    }
}
