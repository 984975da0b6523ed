use console::style;
use miette::Result;
use sprout::config::Settings;
use sprout::hint::{usage_hint, PackageManager};
use sprout::prompt::InquirePrompter;
use sprout::registry::HttpRegistry;
use sprout::{ScaffoldOptions, Scaffolder};

use crate::cli::Cli;

pub fn run(cli: Cli) -> Result<()> {
    let data_pairs: Vec<(String, String)> = cli
        .data
        .into_iter()
        .filter_map(|kv| {
            let mut parts = kv.splitn(2, '=');
            let key = parts.next()?.to_string();
            let value = parts.next()?.to_string();
            Some((key, value))
        })
        .collect();

    let settings = Settings::resolve(cli.registry.as_deref())?;
    let registry = HttpRegistry::new(settings.registry.clone());
    let mut scaffolder = Scaffolder::new(registry, InquirePrompter, settings);

    let options = ScaffoldOptions {
        target: cli.target,
        template: cli.template,
        data: data_pairs,
        defaults: cli.defaults,
        overwrite: cli.overwrite,
    };

    let outcome = match scaffolder.run(options) {
        Ok(outcome) => outcome,
        Err(e) if e.is_cancellation() => {
            eprintln!("{} Operation cancelled", style("\u{2716}").red().bold());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let report = &outcome.report;
    println!(
        "\n{} Scaffolded {} in {}",
        style("\u{2713}").green().bold(),
        style(&outcome.template).bold(),
        style(report.output_dir.display()).cyan()
    );
    println!(
        "  {} files rendered, {} files copied, {} links",
        report.files_rendered.len(),
        report.files_copied.len(),
        report.links.len()
    );
    if !report.skipped.is_empty() {
        println!("  {} entries skipped", report.skipped.len());
    }

    println!("\nDone. Now run:\n");
    for line in usage_hint(&outcome.target.normalized_path, PackageManager::detect()) {
        println!("  {}", style(line).bold());
    }
    println!();

    Ok(())
}

