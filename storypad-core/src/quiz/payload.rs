//! Quizzes as delivered by the story service.
//!
//! ```json
//! {
//!     "story_id": "...",
//!     "difficulty": "medium",
//!     "questions": [
//!         {
//!             "question": "The question text?",
//!             "options": ["Option A", "Option B", "Option C", "Option D"],
//!             "correct_answer": 0,
//!             "explanation": "Why this answer is correct"
//!         }
//!     ]
//! }
//! ```

use super::{Question, QuizError, QuizSession};
use crate::story::Difficulty;

#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    #[error("malformed quiz json")]
    Json(#[from] serde_json::Error),
    #[error("question {question} has no text")]
    EmptyPrompt { question: usize },
    #[error("question {question} option {option} is blank")]
    BlankOption { question: usize, option: usize },
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
pub struct QuizPayload {
    pub questions: Vec<Question>,
    /// The story the quiz was generated for. Empty for standalone quizzes.
    #[serde(default)]
    pub story_id: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}
impl QuizPayload {
    /// Parse from JSON. Generated text is often wrapped in a markdown code fence, which is stripped.
    pub fn from_json(text: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(strip_code_fence(text))?)
    }
    /// Check every question is well-formed, including that no text is blank.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions.into());
        }
        for (number, question) in self.questions.iter().enumerate() {
            if question.prompt.trim().is_empty() {
                return Err(PayloadError::EmptyPrompt { question: number });
            }
            question.check(number)?;
            if let Some(option) = question
                .options
                .iter()
                .position(|option| option.trim().is_empty())
            {
                return Err(PayloadError::BlankOption {
                    question: number,
                    option,
                });
            }
        }
        Ok(())
    }
    /// Validate and start a session over the questions.
    pub fn into_session(self) -> Result<QuizSession, PayloadError> {
        self.validate()?;
        log::debug!(
            "Starting {} quiz with {} questions",
            self.difficulty.as_ref(),
            self.questions.len()
        );
        Ok(QuizSession::new(self.questions)?)
    }
}

/// Strip a surrounding ```` ``` ```` or ```` ```json ```` fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    // Generated quizzes only ever carry a `json` tag.
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}
