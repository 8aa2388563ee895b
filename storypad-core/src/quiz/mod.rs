//! # Quiz sessions
//!
//! A walk over a fixed list of multiple-choice questions. Each question is answered in two steps -
//! an option is *selected* (and may be changed freely), then *confirmed*, which commits it and
//! reveals whether it was correct. Advancing past the last question completes the session and fixes
//! the score.
//!
//! Calls that don't make sense in the current [`Phase`] (confirming with nothing selected, advancing
//! before confirming, ...) are ignored rather than treated as errors, and report that through their
//! return value.

pub mod payload;

pub use payload::QuizPayload;

/// Fewest options a question may offer.
pub const MIN_OPTIONS: usize = 2;

#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`.
    #[serde(rename = "correct_answer")]
    pub correct_index: usize,
    /// Shown along with the correct answer. May be empty.
    #[serde(default)]
    pub explanation: String,
}
impl Question {
    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_index
    }
    /// Check the structural requirements of a question. `number` is only used for error reporting.
    pub fn check(&self, number: usize) -> Result<(), QuizError> {
        if self.options.len() < MIN_OPTIONS {
            return Err(QuizError::TooFewOptions {
                question: number,
                count: self.options.len(),
            });
        }
        if self.correct_index >= self.options.len() {
            return Err(QuizError::CorrectOutOfRange {
                question: number,
                correct: self.correct_index,
                options: self.options.len(),
            });
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,
    #[error("question {question} has {count} options, at least {MIN_OPTIONS} are needed")]
    TooFewOptions { question: usize, count: usize },
    #[error("question {question} marks option {correct} correct, but only has {options}")]
    CorrectOutOfRange {
        question: usize,
        correct: usize,
        options: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Waiting for an option to be confirmed for the current question.
    Answering,
    /// The current question's answer is committed and its correctness shown.
    FeedbackShown,
    /// Every question has been answered. Terminal until [`QuizSession::restart`].
    Completed { score: usize },
}

/// Result of confirming an answer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Feedback<'a> {
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub explanation: &'a str,
}

/// Review of one question, once the session is complete.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct QuestionResult<'a> {
    pub question: &'a Question,
    /// Always `Some` for sessions completed through [`QuizSession::advance`].
    pub answer: Option<usize>,
    pub is_correct: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QuizSession {
    questions: Box<[Question]>,
    /// Index of the current question. Equals `questions.len()` once completed.
    current: usize,
    /// One committed answer slot per question.
    answers: Box<[Option<usize>]>,
    /// Selected, but not yet confirmed, option for the current question.
    tentative: Option<usize>,
    phase: Phase,
}
impl QuizSession {
    /// Start a session. Fails if there are no questions, or any is malformed.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        for (number, question) in questions.iter().enumerate() {
            question.check(number)?;
        }
        let answers = vec![None; questions.len()].into_boxed_slice();
        Ok(Self {
            questions: questions.into_boxed_slice(),
            current: 0,
            answers,
            tentative: None,
            phase: Phase::Answering,
        })
    }
    /// Select an option for the current question, replacing any earlier selection.
    /// Returns false, ignoring the selection, if the answer was already confirmed or
    /// the option does not exist.
    pub fn select_option(&mut self, option: usize) -> bool {
        if self.phase != Phase::Answering {
            return false;
        }
        let options = self.questions[self.current].options.len();
        if option >= options {
            log::warn!("Option {option} selected, but question only has {options}");
            return false;
        }
        self.tentative = Some(option);
        true
    }
    /// Commit the selected option. None, with no effect, if nothing is selected or
    /// the current answer was already confirmed.
    pub fn confirm_answer(&mut self) -> Option<Feedback<'_>> {
        if self.phase != Phase::Answering {
            return None;
        }
        let selected = self.tentative?;
        self.answers[self.current] = Some(selected);
        self.phase = Phase::FeedbackShown;
        log::debug!(
            "Question {} answered with option {selected}",
            self.current + 1
        );
        self.feedback()
    }
    /// Move on from a confirmed answer to the next question, or complete the session if it was
    /// the last. Returns false, with no effect, if the current answer isn't confirmed yet.
    pub fn advance(&mut self) -> bool {
        if self.phase != Phase::FeedbackShown {
            return false;
        }
        self.tentative = None;
        self.current += 1;
        if self.current < self.questions.len() {
            self.phase = Phase::Answering;
        } else {
            let score = self.tally();
            log::debug!("Quiz completed, {score}/{}", self.questions.len());
            self.phase = Phase::Completed { score };
        }
        true
    }
    /// Back to the first question with every answer cleared. Allowed from any phase.
    pub fn restart(&mut self) {
        self.current = 0;
        self.answers.fill(None);
        self.tentative = None;
        self.phase = Phase::Answering;
    }
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Completed { .. })
    }
    /// None before completion.
    #[must_use]
    pub fn score(&self) -> Option<usize> {
        match self.phase {
            Phase::Completed { score } => Some(score),
            _ => None,
        }
    }
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
    /// Index of the question being answered. Equal to the number of questions once completed.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }
    /// None once completed.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }
    #[must_use]
    pub fn tentative_selection(&self) -> Option<usize> {
        self.tentative
    }
    /// The committed answer for a question, if any.
    #[must_use]
    pub fn answer(&self, question: usize) -> Option<usize> {
        self.answers.get(question).copied().flatten()
    }
    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }
    /// Feedback for the current question, while it is being shown.
    #[must_use]
    pub fn feedback(&self) -> Option<Feedback<'_>> {
        if self.phase != Phase::FeedbackShown {
            return None;
        }
        let question = &self.questions[self.current];
        let selected = self.answers[self.current]?;
        Some(Feedback {
            selected,
            correct_index: question.correct_index,
            is_correct: question.is_correct(selected),
            explanation: &question.explanation,
        })
    }
    /// Per-question review. None before completion.
    #[must_use]
    pub fn results(&self) -> Option<impl ExactSizeIterator<Item = QuestionResult<'_>> + '_> {
        if !self.is_complete() {
            return None;
        }
        Some(
            self.questions
                .iter()
                .zip(self.answers.iter())
                .map(|(question, &answer)| QuestionResult {
                    question,
                    answer,
                    is_correct: answer.is_some_and(|answer| question.is_correct(answer)),
                }),
        )
    }
    /// Count of committed answers matching their question's correct option.
    fn tally(&self) -> usize {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .filter(|(question, answer)| answer.is_some_and(|answer| question.is_correct(answer)))
            .count()
    }
}
