use clap::Parser;

#[derive(Parser)]
#[command(
    name = "sprout",
    about = "Scaffold a new project from a template published to an npm registry",
    version
)]
pub struct Cli {
    /// Directory to create the project in (prompted for when omitted)
    pub target: Option<String>,

    /// Template package name, or search text for the template list
    #[arg(short, long)]
    pub template: Option<String>,

    /// Registry base URL (default: https://registry.npmjs.org/)
    #[arg(long)]
    pub registry: Option<String>,

    /// Set variable values (can be repeated: -d key=value)
    #[arg(short, long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,

    /// Use default values without prompting
    #[arg(long)]
    pub defaults: bool,

    /// Empty a non-empty target directory without asking
    #[arg(long)]
    pub overwrite: bool,
}
