pub mod config;
pub mod error;
pub mod hint;
pub mod manifest;
pub mod prompt;
pub mod registry;
pub mod render;
pub mod target;
pub mod template;

use crate::config::Settings;
use crate::error::{Result, SproutError};
use crate::prompt::{collect_locals, PromptOptions, Prompter};
use crate::registry::{Registry, SearchEntry, TemplateRef};
use crate::render::{instantiate, Instantiated, PAYLOAD_DIR};
use crate::target::{
    apply_disposition, ensure_exists, Disposition, TargetSpec, DEFAULT_PROJECT_NAME,
};
use crate::template::{fetch_template, ScratchDir};

pub struct ScaffoldOptions {
    /// Target directory as typed; prompted for when absent.
    pub target: Option<String>,
    /// Template name or search text; the configured keyword query when absent.
    pub template: Option<String>,
    pub data: Vec<(String, String)>,
    pub defaults: bool,
    /// Empty a conflicting target without asking.
    pub overwrite: bool,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct ScaffoldOutcome {
    pub target: TargetSpec,
    pub template: TemplateRef,
    pub report: Instantiated,
}

/// Drives one scaffolding run from target resolution to instantiation.
pub struct Scaffolder<R: Registry, P: Prompter> {
    registry: R,
    prompter: P,
    settings: Settings,
}

impl<R: Registry, P: Prompter> Scaffolder<R, P> {
    pub fn new(registry: R, prompter: P, settings: Settings) -> Self {
        Self {
            registry,
            prompter,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_parts(self) -> (R, P) {
        (self.registry, self.prompter)
    }

    /// Run the whole pipeline. Nothing is written to the target before the
    /// overwrite decision, and a cancelled decision writes nothing at all.
    pub fn run(&mut self, options: ScaffoldOptions) -> Result<ScaffoldOutcome> {
        let target = self.resolve_target(options.target.as_deref(), options.defaults)?;

        let query = options
            .template
            .clone()
            .unwrap_or_else(|| self.settings.search_keyword.clone());
        let candidates = self.registry.search(&query, self.settings.search_size)?;
        let template =
            self.select_template(&candidates, options.template.as_deref(), options.defaults)?;

        if target.has_conflict() {
            let disposition = if options.overwrite {
                Disposition::RemoveAndContinue
            } else {
                self.prompter.overwrite(&target.conflict_message())?
            };
            apply_disposition(disposition, target.path())?;
        }
        ensure_exists(target.path())?;

        let scratch = ScratchDir::new(&self.settings.scratch_dir);
        let template_root = fetch_template(&self.registry, &template, &scratch)?;

        let questions = manifest::load_questions(&template_root, &target.base_name());
        let prompt_options = PromptOptions {
            data_overrides: options.data.into_iter().collect(),
            use_defaults: options.defaults,
        };
        let locals = collect_locals(&questions, &mut self.prompter, &prompt_options)?;

        let report = instantiate(&template_root.join(PAYLOAD_DIR), target.path(), &locals)?;
        scratch.release()?;

        Ok(ScaffoldOutcome {
            target,
            template,
            report,
        })
    }

    fn resolve_target(&mut self, raw: Option<&str>, defaults: bool) -> Result<TargetSpec> {
        match raw {
            Some(raw) => TargetSpec::resolve(Some(raw)),
            None if defaults => TargetSpec::resolve(None),
            None => {
                let answer = self.prompter.target_dir(DEFAULT_PROJECT_NAME)?;
                TargetSpec::resolve(Some(&answer))
            }
        }
    }

    fn select_template(
        &mut self,
        candidates: &[SearchEntry],
        requested: Option<&str>,
        defaults: bool,
    ) -> Result<TemplateRef> {
        if candidates.is_empty() {
            return Err(SproutError::NoTemplates {
                query: requested.unwrap_or(&self.settings.search_keyword).to_string(),
            });
        }

        let exact = requested.and_then(|name| candidates.iter().find(|c| c.template.name == name));
        if let Some(exact) = exact {
            return Ok(exact.template.clone());
        }

        if defaults {
            return Ok(candidates[0].template.clone());
        }

        Ok(self.prompter.select_template(candidates)?.template)
    }
}
