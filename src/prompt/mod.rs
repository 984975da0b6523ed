pub mod engine;

pub use engine::{collect_locals, InquirePrompter, Locals, PromptOptions, Prompter};
