use crate::completion::{ChatModel, DEFAULT_BASE_URL};
use crate::controller::{ChatSettings, InputMode, DEFAULT_SYSTEM_PROMPT};
use clap::Parser;

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["groq_api_key", "GROQ_API_KEY"];

#[derive(Debug, Parser)]
#[command(name = "groqchat", version, about = "Desktop chat window for the Groq completion API")]
pub struct Cli {
    /// Window variant: `chat` (transcript + input line) or `single-shot`
    /// (text box + Send button)
    #[arg(long, default_value = "chat")]
    pub mode: InputMode,

    /// Model selected when the window opens
    #[arg(long, default_value = "Llama3-8b-8192")]
    pub model: ChatModel,

    /// Initial system prompt
    #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "GROQ_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Start with the light palette
    #[arg(long)]
    pub light: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub mode: InputMode,
    pub settings: ChatSettings,
    pub dark_mode: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        Self::from_parts(cli, |name| std::env::var(name).ok())
    }

    fn from_parts(cli: Cli, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: api_key_from(lookup),
            base_url: cli.base_url,
            mode: cli.mode,
            settings: ChatSettings {
                system_prompt: cli.system_prompt,
                model: cli.model,
            },
            dark_mode: !cli.light,
        }
    }
}

/// First non-blank value among [`API_KEY_VARS`].
pub fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
