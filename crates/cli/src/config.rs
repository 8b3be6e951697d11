//! Configuration: TOML file, then environment, then command-line flags.
//!
//! Environment variables are read through clap's `env` support, so a flag and
//! its variable share one field on [`Args`]; the flag wins when both are set.
//! The file fills in whatever neither supplies.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use github::{GithubConfig, DEFAULT_API_BASE};
use llm::{OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use orchestrator::{OrchestratorConfig, DEFAULT_MAX_ROUNDS, DEFAULT_SYSTEM_PROMPT};
use reqwest::Url;
use secrecy::SecretString;
use serde::Deserialize;

/// File read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "repo-assistant.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Natural-language assistant for GitHub branches and pull requests.
#[derive(Debug, Default, Parser)]
#[command(name = "repo-assistant", version, about)]
pub struct Args {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitHub token used for every API call.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub API root (GitHub Enterprise: https://HOST/api/v3/).
    #[arg(long, env = "GITHUB_API_BASE", value_name = "URL")]
    pub github_api_base: Option<String>,

    /// API key for the language-model provider.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat-completions API root.
    #[arg(long, env = "OPENAI_BASE_URL", value_name = "URL")]
    pub openai_base_url: Option<String>,

    /// Model identifier.
    #[arg(long, env = "OPENAI_MODEL")]
    pub model: Option<String>,

    /// Sampling temperature.
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Most model invocations allowed for one request.
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Emit logs as JSON lines instead of compact text.
    #[arg(long)]
    pub json_logs: bool,
}

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

/// Contents of the TOML file. Every key is optional.
///
/// ```toml
/// [github]
/// api_base = "https://api.github.com/"
/// timeout_secs = 30
///
/// [llm]
/// model = "gpt-4"
/// temperature = 0.0
///
/// [assistant]
/// max_rounds = 10
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub github: GithubSection,
    pub llm: LlmSection,
    pub assistant: AssistantSection,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GithubSection {
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantSection {
    pub max_rounds: Option<u32>,
    pub system_prompt: Option<String>,
}

impl FileConfig {
    /// Parses TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid configuration file")
    }

    /// Loads `explicit` if given (it must exist), otherwise
    /// [`DEFAULT_CONFIG_FILE`] if it exists, otherwise an empty config.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

/// Fully resolved, validated configuration for the three components.
#[derive(Debug)]
pub struct Settings {
    pub github: GithubConfig,
    pub llm: OpenAiConfig,
    pub orchestrator: OrchestratorConfig,
}

impl Settings {
    /// Merges flags/environment over the file and applies defaults.
    ///
    /// # Errors
    ///
    /// Fails if no language-model API key is available, a URL does not parse,
    /// or a timeout or round limit is zero. A missing GitHub token is allowed.
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self> {
        let FileConfig {
            github,
            llm,
            assistant,
        } = file;

        let github_token = args
            .github_token
            .clone()
            .or(github.token)
            .filter(|t| !t.trim().is_empty())
            .map(|t| SecretString::new(t.into()));
        let api_key = match args.openai_api_key.clone().or(llm.api_key) {
            Some(key) if !key.trim().is_empty() => SecretString::new(key.into()),
            _ => bail!("OPENAI_API_KEY is not set (use the environment, --openai-api-key, or [llm].api_key)"),
        };

        let github_base = parse_url(
            "GitHub API base",
            args.github_api_base.as_deref().or(github.api_base.as_deref()),
            DEFAULT_API_BASE,
        )?;
        let llm_base = parse_url(
            "model API base",
            args.openai_base_url.as_deref().or(llm.base_url.as_deref()),
            DEFAULT_BASE_URL,
        )?;

        let github_timeout = timeout("github.timeout_secs", github.timeout_secs)?;
        let llm_timeout = timeout("llm.timeout_secs", llm.timeout_secs)?;

        let max_rounds = args
            .max_rounds
            .or(assistant.max_rounds)
            .unwrap_or(DEFAULT_MAX_ROUNDS);
        if max_rounds == 0 {
            bail!("max_rounds must be at least 1");
        }

        let model = args
            .model
            .clone()
            .or(llm.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let temperature = args.temperature.or(llm.temperature).unwrap_or(0.0);

        Ok(Self {
            github: GithubConfig::new(github_token, github_base).with_timeout(github_timeout),
            llm: OpenAiConfig::new(api_key, llm_base)
                .with_model(model)
                .with_temperature(temperature)
                .with_timeout(llm_timeout),
            orchestrator: OrchestratorConfig {
                max_rounds,
                system_prompt: assistant
                    .system_prompt
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            },
        })
    }
}

fn parse_url(what: &str, value: Option<&str>, default: &str) -> Result<Url> {
    let raw = value.unwrap_or(default);
    let url = Url::parse(raw).with_context(|| format!("Invalid {what} URL: {raw}"))?;
    if url.cannot_be_a_base() {
        bail!("Invalid {what} URL: {raw}");
    }
    Ok(url)
}

fn timeout(key: &str, secs: Option<u64>) -> Result<Duration> {
    match secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
        0 => bail!("{key} must be greater than zero"),
        secs => Ok(Duration::from_secs(secs)),
    }
}
