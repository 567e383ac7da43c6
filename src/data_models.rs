use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One ranked hit as delivered by the search endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SearchResult {
    pub fn new(title: &str, path: &str, snippet: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            path: path.to_string(),
            snippet: snippet.to_string(),
            html: None,
            score: None,
        }
    }

    pub fn with_html(mut self, html: &str) -> SearchResult {
        self.html = Some(html.to_string());
        self
    }

    pub fn with_score(mut self, score: f64) -> SearchResult {
        self.score = Some(score);
        self
    }
}

#[derive(Serialize, Debug)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    /// Decodes a search response body.
    ///
    /// Only a body that is not JSON at all is an error. A missing, null or
    /// non-array `results` field yields an empty list, and entries that do
    /// not decode are skipped while the rest are kept in order.
    pub fn from_slice(body: &[u8]) -> Result<SearchResponse, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        let entries = match value.get("results") {
            None | Some(Value::Null) => return Ok(SearchResponse { results: Vec::new() }),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                log::warn!("`results` is not a list, treating as empty: {other}");
                return Ok(SearchResponse { results: Vec::new() });
            }
        };

        let results = entries
            .iter()
            .enumerate()
            .filter_map(|(pos, entry)| match SearchResult::deserialize(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    log::warn!("skipping malformed result #{pos}: {e}");
                    None
                }
            })
            .collect();
        Ok(SearchResponse { results })
    }
}
