use serde::Deserialize;

use crate::error::{Result, SproutError};
use crate::registry::TemplateRef;

/// The subset of a registry version document sprout needs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PackageDetail {
    pub name: String,
    pub version: String,
    pub dist: Dist,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Dist {
    pub tarball: Option<String>,
}

impl PackageDetail {
    pub fn tarball(&self) -> Result<&str> {
        self.dist
            .tarball
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| SproutError::MissingTarball {
                name: self.name.clone(),
                version: self.version.clone(),
            })
    }
}

pub fn parse_package_detail(template: &TemplateRef, json: &str) -> Result<PackageDetail> {
    serde_json::from_str(json).map_err(|e| SproutError::PackageDetailFetch {
        name: template.name.clone(),
        version: template.version.clone(),
        reason: format!("malformed package document: {e}"),
    })
}

/// Path of a package version document relative to the registry base.
/// Scoped names keep their `@` but encode the separator.
pub fn package_path(template: &TemplateRef) -> String {
    format!("{}/{}", template.name.replace('/', "%2F"), template.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tref() -> TemplateRef {
        TemplateRef::new("sprout-template-react", "1.4.0")
    }

    #[test]
    fn parses_tarball_url() {
        let json = r#"{
            "name": "sprout-template-react",
            "version": "1.4.0",
            "dist": {
                "tarball": "https://registry.npmjs.org/sprout-template-react/-/sprout-template-react-1.4.0.tgz",
                "shasum": "abc",
                "integrity": "sha512-abc"
            }
        }"#;
        let detail = parse_package_detail(&tref(), json).unwrap();
        assert_eq!(
            detail.tarball().unwrap(),
            "https://registry.npmjs.org/sprout-template-react/-/sprout-template-react-1.4.0.tgz"
        );
    }

    #[test]
    fn missing_tarball_is_reported() {
        let json = r#"{ "name": "x", "version": "1.0.0", "dist": {} }"#;
        let detail = parse_package_detail(&tref(), json).unwrap();
        assert!(matches!(
            detail.tarball(),
            Err(SproutError::MissingTarball { .. })
        ));
    }

    #[test]
    fn malformed_document_is_a_detail_fetch_failure() {
        let err = parse_package_detail(&tref(), "<html>").unwrap_err();
        match err {
            SproutError::PackageDetailFetch { name, version, .. } => {
                assert_eq!(name, "sprout-template-react");
                assert_eq!(version, "1.4.0");
            }
            other => panic!("expected PackageDetailFetch, got: {other:?}"),
        }
    }

    #[test]
    fn scoped_names_are_encoded() {
        let path = package_path(&TemplateRef::new("@acme/tpl", "0.2.1"));
        assert_eq!(path, "@acme%2Ftpl/0.2.1");
        assert_eq!(package_path(&tref()), "sprout-template-react/1.4.0");
    }
}
