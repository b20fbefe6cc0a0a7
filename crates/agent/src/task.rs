//! What a template run is asked to do: a system prompt plus the opening
//! user message.

use crate::prompts;

/// The two jobs the engine knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Create,
    Transform,
}

/// A seeded template task.
#[derive(Debug, Clone)]
pub struct TemplateTask {
    pub kind: TaskKind,
    pub system_prompt: &'static str,
    pub seed: String,
}

impl TemplateTask {
    /// Create a template. Sample templates, when present and not blank,
    /// switch to the style-following prompt and are appended after `---`.
    pub fn create(instructions: &str, samples: Option<&str>) -> Self {
        match samples.filter(|s| !s.trim().is_empty()) {
            Some(samples) => Self {
                kind: TaskKind::Create,
                system_prompt: prompts::CREATE_STYLED,
                seed: format!("{instructions}\n\n---{samples}"),
            },
            None => Self {
                kind: TaskKind::Create,
                system_prompt: prompts::CREATE_PLAIN,
                seed: instructions.to_string(),
            },
        }
    }

    /// Rewrite `source` according to `instructions`.
    pub fn transform(instructions: &str, source: &str) -> Self {
        Self {
            kind: TaskKind::Transform,
            system_prompt: prompts::TRANSFORM,
            seed: format!("{source}\n\n---{instructions}"),
        }
    }
}
