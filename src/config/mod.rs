pub mod question;
pub mod user;

use std::path::PathBuf;

use crate::error::{Result, SproutError};

pub use question::{Choice, Question, QuestionKind, QuestionSet};
pub use user::{load_user_config, UserConfig};

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";
pub const DEFAULT_SEARCH_KEYWORD: &str = "keywords:sprout-template";
pub const DEFAULT_SEARCH_SIZE: usize = 20;

const REGISTRY_ENV: &str = "SPROUT_REGISTRY";
const NPM_REGISTRY_ENV: &str = "npm_config_registry";
const SCRATCH_DIR_ENV: &str = "SPROUT_SCRATCH_DIR";

/// Resolved runtime settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Registry base URL, always ending in `/`.
    pub registry: String,
    pub search_keyword: String,
    pub search_size: usize,
    pub scratch_dir: PathBuf,
}

impl Settings {
    /// Layer settings: explicit flag, then environment, then the user config
    /// file, then built-in defaults.
    pub fn resolve(registry_flag: Option<&str>) -> Result<Self> {
        let user = load_user_config()?.unwrap_or_default();
        Self::layered(registry_flag, &EnvSource::process(), user)
    }

    fn layered(registry_flag: Option<&str>, env: &EnvSource, user: UserConfig) -> Result<Self> {
        let registry = registry_flag
            .map(String::from)
            .or_else(|| env.registry.clone())
            .or(user.registry)
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string());

        let scratch_dir = match env.scratch_dir.clone().or(user.scratch_dir) {
            Some(dir) => dir,
            None => default_scratch_dir()?,
        };

        Ok(Self {
            registry: normalize_registry(&registry),
            search_keyword: user
                .search_keyword
                .unwrap_or_else(|| DEFAULT_SEARCH_KEYWORD.to_string()),
            search_size: user.search_size.unwrap_or(DEFAULT_SEARCH_SIZE),
            scratch_dir,
        })
    }
}

/// Snapshot of the environment variables that influence settings.
#[derive(Debug, Default)]
struct EnvSource {
    registry: Option<String>,
    scratch_dir: Option<PathBuf>,
}

impl EnvSource {
    fn process() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            registry: non_empty(REGISTRY_ENV).or_else(|| non_empty(NPM_REGISTRY_ENV)),
            scratch_dir: non_empty(SCRATCH_DIR_ENV).map(PathBuf::from),
        }
    }
}

/// Ensure the registry base ends with exactly one `/`.
pub fn normalize_registry(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}

/// `<cache_dir>/sprout/scratch`, shared by every run on this machine.
fn default_scratch_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|d| d.join("sprout").join("scratch"))
        .ok_or_else(|| SproutError::Io {
            context: "unable to determine scratch directory: set SPROUT_SCRATCH_DIR or ensure a home directory exists".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no cache directory available"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let settings = Settings::layered(
            None,
            &EnvSource {
                scratch_dir: Some(PathBuf::from("/tmp/s")),
                ..Default::default()
            },
            UserConfig::default(),
        )
        .unwrap();
        assert_eq!(settings.registry, DEFAULT_REGISTRY);
        assert_eq!(settings.search_keyword, DEFAULT_SEARCH_KEYWORD);
        assert_eq!(settings.search_size, DEFAULT_SEARCH_SIZE);
        assert_eq!(settings.scratch_dir, PathBuf::from("/tmp/s"));
    }

    #[test]
    fn flag_beats_env_beats_user_config() {
        let env = EnvSource {
            registry: Some("https://env.example.com".into()),
            scratch_dir: Some(PathBuf::from("/tmp/env-scratch")),
        };
        let user = || UserConfig {
            registry: Some("https://user.example.com/".into()),
            scratch_dir: Some(PathBuf::from("/tmp/user-scratch")),
            ..Default::default()
        };

        let flagged = Settings::layered(Some("https://flag.example.com//"), &env, user()).unwrap();
        assert_eq!(flagged.registry, "https://flag.example.com/");

        let from_env = Settings::layered(None, &env, user()).unwrap();
        assert_eq!(from_env.registry, "https://env.example.com/");
        assert_eq!(from_env.scratch_dir, PathBuf::from("/tmp/env-scratch"));

        let from_user = Settings::layered(None, &EnvSource::default(), user()).unwrap();
        assert_eq!(from_user.registry, "https://user.example.com/");
        assert_eq!(from_user.scratch_dir, PathBuf::from("/tmp/user-scratch"));
    }

    #[test]
    fn normalize_registry_adds_single_slash() {
        assert_eq!(normalize_registry("https://r.example"), "https://r.example/");
        assert_eq!(normalize_registry("https://r.example///"), "https://r.example/");
    }
}
