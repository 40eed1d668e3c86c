//! The boundary toward answer generation.
//!
//! The retrieval core never calls a language model itself; it assembles an
//! [`AnswerRequest`] (question, context, and presentation knobs) and
//! hands it to whatever implements [`AnswerGenerator`]. Prompt assembly lives
//! here so every generator backend phrases the task the same way.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::DigestError;

/// Reader sophistication the answer should be pitched at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalLevel {
    Elementary,
    HighSchool,
    Undergraduate,
    #[default]
    DomainExpert,
}

impl fmt::Display for TechnicalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elementary => write!(f, "elementary"),
            Self::HighSchool => write!(f, "high school"),
            Self::Undergraduate => write!(f, "undergrad"),
            Self::DomainExpert => write!(f, "domain expert"),
        }
    }
}

// Accept the labels a UI would hand over; anything unrecognized gets the
// default audience.
impl From<&str> for TechnicalLevel {
    fn from(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "elementary" => Self::Elementary,
            "high school" => Self::HighSchool,
            "undergrad" | "undergraduate" => Self::Undergraduate,
            _ => Self::DomainExpert,
        }
    }
}

/// Output shape requested from the generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerFormat {
    #[default]
    Markdown,
    Plain,
}

impl fmt::Display for AnswerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Plain => write!(f, "plain text"),
        }
    }
}

/// Role of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message in the conversation sent to a generator backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Everything a generator needs to answer one question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// The user's question.
    pub question: String,
    /// Article context: full text or retrieved chunks, possibly empty.
    pub context: String,
    pub technical_level: TechnicalLevel,
    pub format: AnswerFormat,
    /// Response language, free-form (e.g. "English").
    pub language: String,
}

impl AnswerRequest {
    /// Request with default presentation settings.
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
            technical_level: TechnicalLevel::default(),
            format: AnswerFormat::default(),
            language: "English".to_string(),
        }
    }

    #[must_use]
    pub fn with_technical_level(mut self, level: TechnicalLevel) -> Self {
        self.technical_level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: AnswerFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// The system instruction: task framing, audience, and article context.
    ///
    /// An empty context is stated outright so the generator tells the user no
    /// usable content was found instead of inventing one.
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You summarize and explain academic papers. Answer clearly and \
             concisely, minimize jargon, and provide context that aids \
             understanding rather than repeating the text.\n",
        );
        prompt.push_str(&format!("Technical level: {}\n", self.technical_level));
        prompt.push_str(&format!("Respond in {} as {}.\n", self.language, self.format));
        if self.context.trim().is_empty() {
            prompt.push_str(
                "\nNo article content is available; say so rather than guessing.",
            );
        } else {
            prompt.push_str(&format!(
                "\nRelevant article text to draw on where applicable:\n{}",
                self.context
            ));
        }
        prompt
    }

    /// Render the request as a system + user conversation.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        let system = self.system_prompt();
        let user = format!(
            "{}\nPlease give your answer at a {} level.",
            self.question, self.technical_level
        );
        vec![
            ChatMessage {
                role: ChatRole::System,
                content: system,
            },
            ChatMessage {
                role: ChatRole::User,
                content: user,
            },
        ]
    }
}

/// Downstream collaborator that turns an [`AnswerRequest`] into prose.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, request: AnswerRequest) -> Result<String, DigestError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_labels_round_trip() {
        for level in [
            TechnicalLevel::Elementary,
            TechnicalLevel::HighSchool,
            TechnicalLevel::Undergraduate,
            TechnicalLevel::DomainExpert,
        ] {
            assert_eq!(TechnicalLevel::from(level.to_string().as_str()), level);
        }
    }

    #[test]
    fn unknown_level_defaults_to_expert() {
        assert_eq!(
            TechnicalLevel::from("postdoc"),
            TechnicalLevel::DomainExpert
        );
    }

    #[test]
    fn system_prompt_embeds_context_and_level() {
        let request = AnswerRequest::new("What did they find?", "The finding was X.")
            .with_technical_level(TechnicalLevel::HighSchool);
        let prompt = request.system_prompt();
        assert!(prompt.contains("The finding was X."));
        assert!(prompt.contains("high school"));
    }

    #[test]
    fn empty_context_is_stated_not_invented() {
        let request = AnswerRequest::new("Anything?", "  ");
        let prompt = request.system_prompt();
        assert!(prompt.contains("No article content is available"));
    }

    #[test]
    fn conversation_has_system_then_user() {
        let messages = AnswerRequest::new("Why?", "Because.").into_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        assert!(messages[1].content.starts_with("Why?"));
        assert!(messages[1].content.contains("domain expert"));
    }
}
