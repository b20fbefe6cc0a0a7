//! Known models and the short aliases accepted on the command line.

use crate::ConfigError;

/// A model id together with every alias that selects it.
#[derive(Debug, Clone, Copy)]
pub struct ModelInfo {
    pub id: &'static str,
    /// The first alias is the one shown in listings.
    pub aliases: &'static [&'static str],
}

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gpt-4o-mini",
        aliases: &["mini", "4o-mini", "mini4o", "gpt4o-mini", "gpt-4o-mini"],
    },
    ModelInfo {
        id: "gpt-4o",
        aliases: &["4o", "o4", "gpt4o", "gpt-4o"],
    },
    ModelInfo {
        id: "anthropic.claude-3-5-sonnet-20241022-v2:0",
        aliases: &[
            "sonnet",
            "sonnet35",
            "sonnet-v2",
            "sonnetv2",
            "sonnet3.5",
            "sonnet-3.5",
            "anthropic.claude-3-5-sonnet-20241022-v2:0",
        ],
    },
    ModelInfo {
        id: "anthropic.claude-3-5-haiku-20241022-v1:0",
        aliases: &["haiku35", "haiku-3.5", "anthropic.claude-3-5-haiku-20241022-v1:0"],
    },
    ModelInfo {
        id: "anthropic.claude-3-haiku-20240307-v1:0",
        aliases: &["haiku", "haiku3", "haiku-3", "anthropic.claude-3-haiku-20240307-v1:0"],
    },
];

/// Map an alias (or a canonical id) to the canonical model id.
pub fn resolve_model(name: &str) -> Result<&'static str, ConfigError> {
    MODELS
        .iter()
        .find(|m| m.aliases.contains(&name))
        .map(|m| m.id)
        .ok_or_else(|| ConfigError::UnknownModel(name.to_string()))
}

/// One `"<alias> - <id>"` line per known model, for `--help` style listings.
pub fn choices() -> Vec<String> {
    MODELS
        .iter()
        .map(|m| format!("{} - {}", m.aliases.first().copied().unwrap_or(m.id), m.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!(resolve_model("mini").unwrap(), "gpt-4o-mini");
        assert_eq!(resolve_model("o4").unwrap(), "gpt-4o");
        assert_eq!(resolve_model("haiku").unwrap(), "anthropic.claude-3-haiku-20240307-v1:0");
        assert_eq!(
            resolve_model("sonnet-3.5").unwrap(),
            "anthropic.claude-3-5-sonnet-20241022-v2:0"
        );
    }

    #[test]
    fn canonical_ids_resolve_to_themselves() {
        for model in MODELS {
            assert_eq!(resolve_model(model.id).unwrap(), model.id);
        }
    }

    #[test]
    fn unknown_alias_is_an_error() {
        let err = resolve_model("gpt-2").unwrap_err();
        assert_eq!(err.to_string(), "Model gpt-2 not found");
    }

    #[test]
    fn choices_list_first_alias() {
        let lines = choices();
        assert_eq!(lines.len(), MODELS.len());
        assert_eq!(lines[0], "mini - gpt-4o-mini");
        assert!(lines.iter().any(|l| l.starts_with("haiku35 - ")));
    }
}
