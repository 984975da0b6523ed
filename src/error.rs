#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SproutError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Prompt cancelled by user")]
    PromptCancelled,

    #[error("Interactive prompt failed: {reason}")]
    #[diagnostic(help("Run sprout in a terminal, or pass --defaults and -d KEY=VALUE"))]
    Prompt { reason: String },

    #[error("Failed to fetch package detail for {name}@{version}: {reason}")]
    #[diagnostic(help("Check the template name, version and your registry settings"))]
    PackageDetailFetch {
        name: String,
        version: String,
        reason: String,
    },

    #[error("Package {name}@{version} does not declare a dist.tarball")]
    MissingTarball { name: String, version: String },

    #[error("Failed to download template archive from {url}")]
    #[diagnostic(help("Check your network connection"))]
    Download { url: String, reason: String },

    #[error("Template search failed: {message}")]
    #[diagnostic(help("Check your network connection and the registry URL"))]
    RegistrySearch { message: String },

    #[error("No templates found for '{query}'")]
    #[diagnostic(help("Try a different --template search term"))]
    NoTemplates { query: String },

    #[error("Failed to extract template archive into {path}")]
    Extract {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template archive has no 'package/' directory: {path}")]
    #[diagnostic(help("Template packages must be published as npm tarballs"))]
    MalformedArchive { path: PathBuf },

    #[error("Template payload directory not found: {path}")]
    #[diagnostic(help("The template package must contain a 'boilerplate/' subdirectory"))]
    PayloadMissing { path: PathBuf },

    #[error("Refusing to write {rendered} (from {path}) outside the target directory")]
    #[diagnostic(help("Template variables used in file names must not contain path separators or '..'"))]
    UnsafePath { path: PathBuf, rendered: PathBuf },

    #[error("Failed to parse {path}")]
    #[diagnostic(help("Check the TOML syntax in your sprout config file"))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SproutError {
    /// Whether the run ended because the user backed out rather than failed.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SproutError::Cancelled | SproutError::PromptCancelled)
    }
}

pub type Result<T> = std::result::Result<T, SproutError>;
