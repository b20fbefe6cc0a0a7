//! Shared setup for the template commands: config, corpus, engine, input.

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stackwright_agent::TemplateEngine;
use stackwright_config::{AppConfig, models};
use stackwright_schema::{CorpusRefresher, SchemaIndexHandle};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Global flags that shape every template run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub model: Option<String>,
    pub no_refresh: bool,
}

/// Providers that run without credentials.
const KEYLESS_PROVIDERS: &[&str] = &["ollama", "vllm"];

/// Load the config file and apply the `--model` override.
pub fn load_config(options: &RunOptions) -> CliResult<AppConfig> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(model) = &options.model {
        apply_model_override(&mut config, model)?;
    }
    Ok(config)
}

/// Replace the configured model with the one an alias names.
pub fn apply_model_override(config: &mut AppConfig, alias: &str) -> CliResult<()> {
    let id = models::resolve_model(alias).map_err(|e| {
        format!(
            "{e}\n\nKnown models:\n  {}",
            models::choices().join("\n  ")
        )
    })?;
    config.default_model = id.to_string();
    Ok(())
}

pub fn refresher(config: &AppConfig) -> CorpusRefresher {
    CorpusRefresher::new(
        &config.schemas.dir,
        &config.schemas.region,
        config.schemas.refresh_interval(),
    )
}

/// Bring the corpus up to date when auto refresh is on. A failed download
/// is logged and the existing corpus is used as is.
pub async fn prepare_corpus(config: &AppConfig, options: &RunOptions) {
    if options.no_refresh || !config.schemas.auto_refresh {
        return;
    }
    match refresher(config).refresh_if_stale().await {
        Ok(Some(report)) => {
            tracing::info!(written = report.written.len(), "Schema corpus refreshed");
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Schema refresh failed, using the existing corpus"),
    }
}

/// Wire provider, schema lookup tool and loop limits into an engine.
pub fn build_engine(config: &AppConfig) -> CliResult<TemplateEngine> {
    let router = stackwright_providers::build_from_config(config);
    let model_id = config.model_id();
    let (provider, model) = router
        .resolve(&model_id)
        .ok_or_else(|| format!("No provider configured for model {model_id}"))?;

    ensure_api_key(config, provider.name())?;

    let index = SchemaIndexHandle::lazy(&config.schemas.dir);
    let tools = Arc::new(stackwright_tools::default_registry(index));

    tracing::debug!(provider = provider.name(), model = %model, "Engine ready");
    Ok(TemplateEngine::from_config(provider, model, tools, config))
}

fn ensure_api_key(config: &AppConfig, provider: &str) -> CliResult<()> {
    if KEYLESS_PROVIDERS.contains(&provider) {
        return Ok(());
    }
    let configured = config
        .providers
        .get(provider)
        .is_some_and(|p| p.api_key.is_some())
        || config.api_key.is_some();
    if configured {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured for {provider}!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    STACKWRIGHT_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}

/// Instructions from the flag, else everything on stdin.
pub fn read_instructions(flag: Option<String>) -> CliResult<String> {
    let text = match flag {
        Some(text) => text,
        None => {
            let mut stdin = std::io::stdin();
            if stdin.is_terminal() {
                eprintln!("Enter instructions, then Ctrl-D:");
            }
            let mut text = String::new();
            stdin.read_to_string(&mut text)?;
            text
        }
    };

    let text = text.trim();
    if text.is_empty() {
        return Err("No instructions given".into());
    }
    Ok(text.to_string())
}

/// Contents of every sample file joined with YAML document separators.
/// `None` when no files were given.
pub fn load_samples(paths: &[PathBuf]) -> CliResult<Option<String>> {
    if paths.is_empty() {
        return Ok(None);
    }
    let mut contents = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read sample {}: {e}", path.display()))?;
        contents.push(text);
    }
    Ok(Some(contents.join("\n---\n")))
}

/// `generated_2024-05-01_13-45-09.yml` for the given moment.
pub fn default_output_name<Tz>(now: chrono::DateTime<Tz>) -> PathBuf
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    PathBuf::from(format!("generated_{}.yml", now.format("%Y-%m-%d_%H-%M-%S")))
}

/// Write `text` to `path`, or to stdout when `path` is `-`.
pub fn write_output(path: &Path, text: &str) -> CliResult<()> {
    if path == Path::new("-") {
        println!("{text}");
        return Ok(());
    }
    std::fs::write(path, text)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn samples_are_joined_as_documents() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.yml");
        let b = dir.path().join("b.yml");
        std::fs::write(&a, "Resources:\n  A: {}").unwrap();
        std::fs::write(&b, "Resources:\n  B: {}").unwrap();

        let joined = load_samples(&[a, b]).unwrap().unwrap();
        assert_eq!(joined, "Resources:\n  A: {}\n---\nResources:\n  B: {}");
    }

    #[test]
    fn no_samples_is_none() {
        assert!(load_samples(&[]).unwrap().is_none());
    }

    #[test]
    fn missing_sample_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_samples(&[dir.path().join("nope.yml")]).unwrap_err();
        assert!(err.to_string().contains("nope.yml"));
    }

    #[test]
    fn output_name_carries_the_timestamp() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 13, 45, 9).unwrap();
        assert_eq!(
            default_output_name(now),
            PathBuf::from("generated_2024-05-01_13-45-09.yml")
        );
    }

    #[test]
    fn model_override_resolves_aliases() {
        let mut config = AppConfig::default();
        apply_model_override(&mut config, "sonnet").unwrap();
        assert_eq!(config.default_model, "anthropic.claude-3-5-sonnet-20241022-v2:0");

        let err = apply_model_override(&mut config, "gpt-9").unwrap_err();
        assert!(err.to_string().contains("Known models"));
        assert_eq!(config.default_model, "anthropic.claude-3-5-sonnet-20241022-v2:0");
    }

    #[test]
    fn flag_instructions_are_trimmed() {
        assert_eq!(read_instructions(Some("  A queue \n".into())).unwrap(), "A queue");
        assert!(read_instructions(Some("   ".into())).is_err());
    }

    #[test]
    fn keyless_providers_skip_the_check() {
        let config = AppConfig::default();
        assert!(ensure_api_key(&config, "ollama").is_ok());

        let config = AppConfig {
            api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };
        assert!(ensure_api_key(&config, "openai").is_ok());
    }

    #[test]
    fn engine_uses_the_resolved_model() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            default_model: "haiku".into(),
            ..AppConfig::default()
        };
        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.model(), "claude-3-haiku-20240307");
    }

    #[test]
    fn huge_refresh_interval_never_goes_stale() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.schemas.dir = dir.path().to_path_buf();
        config.schemas.refresh_interval_hours = u64::MAX;

        let refresher = refresher(&config);
        refresher.mark_updated(1_000).unwrap();
        assert!(!refresher.needs_refresh(i64::MAX).unwrap());
    }

    #[test]
    fn refresher_interval_is_in_hours() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.schemas.dir = dir.path().join("db");
        config.schemas.refresh_interval_hours = 1;

        let refresher = refresher(&config);
        assert_eq!(refresher.dir(), dir.path().join("db"));
        // Never refreshed: stale at any positive time
        assert!(refresher.needs_refresh(3601).unwrap());
        refresher.mark_updated(1_000).unwrap();
        assert!(!refresher.needs_refresh(1_000 + 3600).unwrap());
        assert!(refresher.needs_refresh(1_000 + 3601).unwrap());
    }
}
