use serde::Deserialize;

use crate::error::{Result, SproutError};
use crate::registry::TemplateRef;

/// One candidate returned by a registry search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEntry {
    pub template: TemplateRef,
    pub description: String,
}

impl std::fmt::Display for SearchEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.template.name, self.template.version)?;
        if !self.description.is_empty() {
            write!(f, " - {}", self.description)?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    objects: Vec<SearchObject>,
}

#[derive(Deserialize)]
struct SearchObject {
    package: SearchPackage,
}

#[derive(Deserialize)]
struct SearchPackage {
    name: String,
    version: String,
    description: Option<String>,
}

pub fn parse_search_response(json: &str) -> Result<Vec<SearchEntry>> {
    let response: SearchResponse =
        serde_json::from_str(json).map_err(|e| SproutError::RegistrySearch {
            message: format!("Failed to parse search response: {e}"),
        })?;

    Ok(response
        .objects
        .into_iter()
        .map(|obj| SearchEntry {
            template: TemplateRef::new(obj.package.name, obj.package.version),
            description: obj.package.description.unwrap_or_default(),
        })
        .collect())
}
