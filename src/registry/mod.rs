pub mod package;
pub mod search;

use std::io::Read;

use console::style;

use crate::error::{Result, SproutError};

pub use package::{package_path, parse_package_detail, Dist, PackageDetail};
pub use search::{parse_search_response, SearchEntry};

const USER_AGENT: &str = concat!("sprout/", env!("CARGO_PKG_VERSION"));

/// Identifies a template package; fixed once the user picks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub name: String,
    pub version: String,
}

impl TemplateRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Access to a package registry holding template packages.
pub trait Registry {
    /// Keyword search; an empty result is not an error.
    fn search(&self, query: &str, size: usize) -> Result<Vec<SearchEntry>>;

    /// Look up the version document for an exact name and version.
    fn package_detail(&self, template: &TemplateRef) -> Result<PackageDetail>;

    /// Open a streaming reader over a distribution archive.
    fn download(&self, url: &str) -> Result<Box<dyn Read>>;
}

/// Registry client speaking the npm registry HTTP API.
///
/// Redirects are followed, timeouts are the transport defaults and
/// nothing is retried.
pub struct HttpRegistry {
    base: String,
    agent: ureq::Agent,
}

impl HttpRegistry {
    /// `base` must end with `/`, see [`crate::config::normalize_registry`].
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        if base.starts_with("http://") {
            eprintln!(
                "{} using insecure http:// registry; consider using https:// instead",
                style("warning:").yellow().bold()
            );
        }
        Self {
            base,
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Registry for HttpRegistry {
    fn search(&self, query: &str, size: usize) -> Result<Vec<SearchEntry>> {
        let url = format!("{}-/v1/search", self.base);

        let response = self
            .agent
            .get(&url)
            .query("text", query)
            .query("size", size.to_string())
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| SproutError::RegistrySearch {
                message: format!("HTTP request failed: {e}"),
            })?;

        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| SproutError::RegistrySearch {
                message: format!("Failed to read response body: {e}"),
            })?;

        parse_search_response(&body)
    }

    fn package_detail(&self, template: &TemplateRef) -> Result<PackageDetail> {
        let url = format!("{}{}", self.base, package_path(template));
        let fetch_failed = |reason: String| SproutError::PackageDetailFetch {
            name: template.name.clone(),
            version: template.version.clone(),
            reason,
        };

        let response = self
            .agent
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => fetch_failed(format!("{url} returned HTTP {code}")),
                other => fetch_failed(format!("HTTP request failed: {other}")),
            })?;

        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| fetch_failed(format!("Failed to read response body: {e}")))?;

        parse_package_detail(template, &body)
    }

    fn download(&self, url: &str) -> Result<Box<dyn Read>> {
        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| SproutError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Box::new(response.into_body().into_reader()))
    }
}
