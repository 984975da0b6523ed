//! Post-scaffold instructions printed once the project is written.

const USER_AGENT_ENV: &str = "npm_config_user_agent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    /// Guess the invoking package manager from its user-agent string,
    /// e.g. `pnpm/9.1.0 npm/? node/v20.11.0 linux x64`.
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let name = user_agent
            .and_then(|ua| ua.split_whitespace().next())
            .and_then(|first| first.split('/').next())
            .unwrap_or_default();

        match name {
            "yarn" => PackageManager::Yarn,
            "pnpm" => PackageManager::Pnpm,
            "bun" => PackageManager::Bun,
            _ => PackageManager::Npm,
        }
    }

    pub fn detect() -> Self {
        Self::from_user_agent(std::env::var(USER_AGENT_ENV).ok().as_deref())
    }

    pub fn install_command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm install",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm install",
            PackageManager::Bun => "bun install",
        }
    }

    pub fn start_command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm start",
            PackageManager::Yarn => "yarn start",
            PackageManager::Pnpm => "pnpm start",
            PackageManager::Bun => "bun start",
        }
    }
}

/// Shell lines that take the user from here to a running project.
pub fn usage_hint(target_dir: &str, manager: PackageManager) -> Vec<String> {
    let mut lines = Vec::new();
    if target_dir != "." {
        let dir = if target_dir.contains(char::is_whitespace) {
            format!("\"{target_dir}\"")
        } else {
            target_dir.to_string()
        };
        lines.push(format!("cd {dir}"));
    }
    lines.push(manager.install_command().to_string());
    lines.push(manager.start_command().to_string());
    lines
}
