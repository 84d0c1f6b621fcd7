use super::AnswerGenerator;
use async_trait::async_trait;
use gertaxlaw_client_api_messages::Question;

/// Fills every question with a fixed stand-in answer.
///
/// Lets the whole generate/validate/submit flow be tried without a model.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderGenerator;

#[async_trait]
impl AnswerGenerator for PlaceholderGenerator {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn answer(&self, question: &Question) -> anyhow::Result<String> {
        Ok(format!(
            "This is a placeholder answer for question {}. \
             Run `gertaxlaw generate --provider openai` to answer with a real model.",
            question.id
        ))
    }
}
