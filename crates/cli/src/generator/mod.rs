//! Producing answers for benchmark questions.
//!
//! Grading on the server uses `temperature = 0` and `max_tokens = 4096`, so
//! the model-backed generators send exactly those settings.

mod chat;
mod placeholder;

pub use chat::ChatCompletionsGenerator;
pub use placeholder::PlaceholderGenerator;

use async_trait::async_trait;
use gertaxlaw_client_api_messages::Question;

pub const TEMPERATURE: f32 = 0.0;
pub const MAX_TOKENS: u32 = 4096;
pub const SYSTEM_PROMPT: &str = "You are an expert in German tax law.";

const THINK_END: &str = "</think>";

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Short label for progress output.
    fn name(&self) -> &str;

    async fn answer(&self, question: &Question) -> anyhow::Result<String>;
}

/// Which backend `generate` uses.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Provider {
    #[default]
    Placeholder,
    /// Any OpenAI compatible `/chat/completions` endpoint.
    OpenAi,
}

impl clap::ValueEnum for Provider {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Placeholder, Self::OpenAi]
    }
    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Placeholder => Some(clap::builder::PossibleValue::new("placeholder")),
            Self::OpenAi => Some(
                clap::builder::PossibleValue::new("openai").aliases(["openai-compatible", "chat-completions"]),
            ),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as clap::ValueEnum>::from_str(s.trim(), true).map_err(|_| format!("unknown provider: '{}'", s.trim()))
    }
}

/// Strip the reasoning block some models (DeepSeek-R1 and friends) prepend.
///
/// Everything up to and including the first `</think>` is dropped and the rest
/// trimmed. Answers without the tag are returned untouched.
pub fn remove_thinking_trace(answer: &str) -> &str {
    match answer.find(THINK_END) {
        Some(idx) => answer[idx + THINK_END.len()..].trim(),
        None => answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_everything_through_think_end() {
        let raw = "<think>\nLet me recall § 32a EStG...\n</think>\n\n  Der Grundfreibetrag beträgt 11.604 €. ";
        assert_eq!(remove_thinking_trace(raw), "Der Grundfreibetrag beträgt 11.604 €.");
    }

    #[test]
    fn only_the_first_tag_counts() {
        assert_eq!(remove_thinking_trace("a</think> b </think> c"), "b </think> c");
    }

    #[test]
    fn answers_without_trace_are_untouched() {
        assert_eq!(remove_thinking_trace("  plain answer \n"), "  plain answer \n");
        assert_eq!(remove_thinking_trace(""), "");
    }

    #[test]
    fn dangling_tag_leaves_empty_answer() {
        assert_eq!(remove_thinking_trace("<think>still thinking</think>   "), "");
    }

    #[test]
    fn provider_names_parse() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!(" Placeholder ".parse::<Provider>().unwrap(), Provider::Placeholder);
        assert!("anthropic".parse::<Provider>().is_err());
    }
}
