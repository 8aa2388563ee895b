//! # Story backend contract
//!
//! Request and response bodies exchanged with the remote story service, along with the client-side
//! checks the service would otherwise reject a request for. Transport is not handled here.

use base64::Engine;

use crate::quiz::{payload::PayloadError, QuizPayload, QuizSession};

pub const MIN_KEYWORDS_CHARS: usize = 2;
pub const MAX_KEYWORDS_CHARS: usize = 500;
pub const MAX_LANGUAGE_CHARS: usize = 10;
pub const MAX_AUDIO_TEXT_CHARS: usize = 10_000;

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InputType {
    Sketch,
    Diagram,
    Keyword,
}
impl InputType {
    /// Whether requests of this type are made from an image.
    #[must_use]
    pub fn carries_image(self) -> bool {
        matches!(self, Self::Sketch | Self::Diagram)
    }
}

/// Reader age bracket, which drives story vocabulary and quiz difficulty.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::EnumString,
)]
pub enum AgeGroup {
    #[serde(rename = "5-7")]
    #[strum(serialize = "5-7")]
    FiveToSeven,
    #[default]
    #[serde(rename = "8-10")]
    #[strum(serialize = "8-10")]
    EightToTen,
    #[serde(rename = "11-13")]
    #[strum(serialize = "11-13")]
    ElevenToThirteen,
}
impl AgeGroup {
    #[must_use]
    pub fn difficulty(self) -> Difficulty {
        match self {
            Self::FiveToSeven => Difficulty::Easy,
            Self::EightToTen => Difficulty::Medium,
            Self::ElevenToThirteen => Difficulty::Hard,
        }
    }
}

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoryRequestError {
    #[error("image data is required for {} input", .0.as_ref())]
    MissingImage(InputType),
    #[error("image data is not valid base64")]
    BadImageData,
    #[error("keywords are required for keyword input")]
    MissingKeywords,
    #[error("keywords must be at least {MIN_KEYWORDS_CHARS} characters")]
    KeywordsTooShort,
    #[error("keywords are {0} characters long, at most {MAX_KEYWORDS_CHARS} allowed")]
    KeywordsTooLong(usize),
    #[error("language code {0:?} is too long")]
    LanguageTooLong(String),
}

/// Body of a story generation request.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
pub struct StoryRequest {
    pub input_type: InputType,
    /// Base64 image, optionally as a `data:` URI. Required for sketches and diagrams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Required for keyword input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default)]
    pub age_group: AgeGroup,
    #[serde(default = "default_language")]
    pub language: String,
}
fn default_language() -> String {
    "en".to_owned()
}
impl StoryRequest {
    #[must_use]
    pub fn image(
        input_type: InputType,
        image_data: String,
        age_group: AgeGroup,
        language: &str,
    ) -> Self {
        Self {
            input_type,
            image_data: Some(image_data),
            keywords: None,
            age_group,
            language: language.to_owned(),
        }
    }
    /// Keywords are sanitized with [`sanitize_keywords`].
    #[must_use]
    pub fn keywords(keywords: &str, age_group: AgeGroup, language: &str) -> Self {
        Self {
            input_type: InputType::Keyword,
            image_data: None,
            keywords: Some(sanitize_keywords(keywords)),
            age_group,
            language: language.to_owned(),
        }
    }
    /// Check the request would be accepted by the service.
    pub fn validate(&self) -> Result<(), StoryRequestError> {
        if self.language.chars().count() > MAX_LANGUAGE_CHARS {
            return Err(StoryRequestError::LanguageTooLong(self.language.clone()));
        }
        if let Some(keywords) = &self.keywords {
            let len = keywords.chars().count();
            if len > MAX_KEYWORDS_CHARS {
                return Err(StoryRequestError::KeywordsTooLong(len));
            }
        }
        if let Some(image) = &self.image_data {
            let payload = strip_data_uri(image);
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|_| StoryRequestError::BadImageData)?;
        }

        if self.input_type.carries_image() {
            if self.image_data.as_deref().map_or(true, str::is_empty) {
                return Err(StoryRequestError::MissingImage(self.input_type));
            }
        } else {
            let keywords = self.keywords.as_deref().map_or("", str::trim);
            if keywords.is_empty() {
                return Err(StoryRequestError::MissingKeywords);
            }
            if keywords.chars().count() < MIN_KEYWORDS_CHARS {
                return Err(StoryRequestError::KeywordsTooShort);
            }
        }
        Ok(())
    }
}

/// Remove markup-ish characters and surrounding whitespace from user keywords.
#[must_use]
pub fn sanitize_keywords(keywords: &str) -> String {
    keywords
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | '[' | ']' | '\\'))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// `data:image/png;base64,AAAA` -> `AAAA`. Anything else is returned unchanged.
#[must_use]
pub fn strip_data_uri(data: &str) -> &str {
    if data.starts_with("data:") {
        if let Some((_, payload)) = data.split_once(',') {
            return payload;
        }
    }
    data
}

/// A generated story.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct StoryResponse {
    pub story_id: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    #[serde(default)]
    pub concepts_covered: Vec<String>,
    pub age_group: AgeGroup,
    pub word_count: u32,
    #[serde(default)]
    pub quiz: Option<QuizPayload>,
    #[serde(default)]
    pub audio_available: bool,
}
impl StoryResponse {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
    /// Start a quiz over the attached questions, if the story came with any.
    pub fn quiz_session(&self) -> Result<Option<QuizSession>, PayloadError> {
        self.quiz.clone().map(QuizPayload::into_session).transpose()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioRequestError {
    #[error("no text to narrate")]
    EmptyText,
    #[error("text is {0} characters long, at most {MAX_AUDIO_TEXT_CHARS} allowed")]
    TextTooLong(usize),
}

/// Body of a text-to-speech request.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
pub struct AudioRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Rate adjustment such as `"+10%"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
}
impl AudioRequest {
    /// Narrate a whole story with the service's default voice.
    #[must_use]
    pub fn for_story(story: &StoryResponse, language: &str) -> Self {
        Self {
            text: story.content.clone(),
            voice: None,
            language: language.to_owned(),
            rate: None,
        }
    }
    pub fn validate(&self) -> Result<(), AudioRequestError> {
        let len = self.text.chars().count();
        if self.text.trim().is_empty() {
            Err(AudioRequestError::EmptyText)
        } else if len > MAX_AUDIO_TEXT_CHARS {
            Err(AudioRequestError::TextTooLong(len))
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct AudioResponse {
    pub audio_id: String,
    pub audio_url: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default = "default_audio_format")]
    pub format: String,
}
fn default_audio_format() -> String {
    "mp3".to_owned()
}

/// Error body returned by the service on failure.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn age_groups() {
        assert_eq!(AgeGroup::default(), AgeGroup::EightToTen);
        assert_eq!(AgeGroup::FiveToSeven.difficulty(), Difficulty::Easy);
        assert_eq!(AgeGroup::ElevenToThirteen.difficulty(), Difficulty::Hard);
        assert_eq!("11-13".parse(), Ok(AgeGroup::ElevenToThirteen));
        assert_eq!(
            serde_json::to_string(&AgeGroup::FiveToSeven).unwrap(),
            "\"5-7\""
        );
        assert_eq!(AgeGroup::EightToTen.as_ref(), "8-10");
    }
    #[test]
    fn sanitize() {
        assert_eq!(
            sanitize_keywords("  <b>dragons</b> {and} [castles]\\ "),
            "bdragons/b and castles"
        );
        assert_eq!(sanitize_keywords("<>"), "");
    }
    #[test]
    fn keyword_requests() {
        let request = StoryRequest::keywords("space, cats", AgeGroup::FiveToSeven, "en");
        assert_eq!(request.validate(), Ok(()));

        // Nothing left after sanitizing.
        let request = StoryRequest::keywords(" [] ", AgeGroup::default(), "en");
        assert_eq!(request.validate(), Err(StoryRequestError::MissingKeywords));

        // Too short once trimmed.
        let request = StoryRequest::keywords(" x ", AgeGroup::default(), "en");
        assert_eq!(request.validate(), Err(StoryRequestError::KeywordsTooShort));
        let request = StoryRequest::keywords("ox", AgeGroup::default(), "en");
        assert_eq!(request.validate(), Ok(()));

        let request = StoryRequest::keywords(&"a".repeat(501), AgeGroup::default(), "en");
        assert_eq!(
            request.validate(),
            Err(StoryRequestError::KeywordsTooLong(501))
        );

        let request = StoryRequest::keywords("ok", AgeGroup::default(), "not-a-language");
        assert!(matches!(
            request.validate(),
            Err(StoryRequestError::LanguageTooLong(_))
        ));
    }
    #[test]
    fn image_requests() {
        let request = StoryRequest::image(
            InputType::Diagram,
            "data:image/png;base64,aGVsbG8=".to_owned(),
            AgeGroup::default(),
            "en",
        );
        assert_eq!(request.validate(), Ok(()));
        // Bare base64 too.
        let request = StoryRequest::image(
            InputType::Sketch,
            "aGVsbG8=".to_owned(),
            AgeGroup::default(),
            "en",
        );
        assert_eq!(request.validate(), Ok(()));

        let request = StoryRequest::image(
            InputType::Sketch,
            "data:image/png;base64,???".to_owned(),
            AgeGroup::default(),
            "en",
        );
        assert_eq!(request.validate(), Err(StoryRequestError::BadImageData));

        let mut request = StoryRequest::keywords("cats", AgeGroup::default(), "en");
        request.input_type = InputType::Sketch;
        assert_eq!(
            request.validate(),
            Err(StoryRequestError::MissingImage(InputType::Sketch))
        );
    }
    #[test]
    fn request_json() {
        let request = StoryRequest::keywords("owls", AgeGroup::ElevenToThirteen, "en");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "input_type": "keyword",
                "keywords": "owls",
                "age_group": "11-13",
                "language": "en",
            })
        );
        // Defaults fill in on the way back.
        let parsed: StoryRequest =
            serde_json::from_str(r#"{"input_type":"keyword","keywords":"owls"}"#).unwrap();
        assert_eq!(parsed.age_group, AgeGroup::EightToTen);
        assert_eq!(parsed.language, "en");
    }
    #[test]
    fn story_with_quiz() {
        let story = StoryResponse::from_json(
            r#"{
                "story_id": "abc",
                "title": "The Moon Cat",
                "content": "Once upon a time...",
                "summary": "A cat visits the moon.",
                "concepts_covered": ["gravity"],
                "age_group": "5-7",
                "word_count": 4,
                "quiz": {
                    "story_id": "abc",
                    "difficulty": "easy",
                    "questions": [{
                        "question": "Where did the cat go?",
                        "options": ["The moon", "The sea"],
                        "correct_answer": 0
                    }]
                }
            }"#,
        )
        .unwrap();
        assert!(!story.audio_available);
        let session = story.quiz_session().unwrap().unwrap();
        assert_eq!(session.questions().len(), 1);

        let mut story = story;
        story.quiz = None;
        assert!(story.quiz_session().unwrap().is_none());
    }
    #[test]
    fn audio() {
        let story = StoryResponse {
            story_id: "id".into(),
            title: "t".into(),
            content: "words".into(),
            summary: "s".into(),
            concepts_covered: vec![],
            age_group: AgeGroup::default(),
            word_count: 1,
            quiz: None,
            audio_available: false,
        };
        let request = AudioRequest::for_story(&story, "en");
        assert_eq!(request.validate(), Ok(()));

        let mut empty = request.clone();
        empty.text = "   ".into();
        assert_eq!(empty.validate(), Err(AudioRequestError::EmptyText));

        let mut long = request;
        long.text = "x".repeat(MAX_AUDIO_TEXT_CHARS + 1);
        assert_eq!(
            long.validate(),
            Err(AudioRequestError::TextTooLong(MAX_AUDIO_TEXT_CHARS + 1))
        );

        let response: AudioResponse =
            serde_json::from_str(r#"{"audio_id":"a","audio_url":"/audio/a"}"#).unwrap();
        assert_eq!(response.format, "mp3");
        assert_eq!(response.duration_seconds, None);
    }
    #[test]
    fn error_bodies() {
        let error: ErrorResponse = serde_json::from_str(
            r#"{
                "error": "ValidationError",
                "message": "Keywords must be at least 2 characters",
                "details": {"field": "keywords"}
            }"#,
        )
        .unwrap();
        assert_eq!(error.error, "ValidationError");
        assert_eq!(error.message, "Keywords must be at least 2 characters");
        assert_eq!(
            error.details,
            Some(serde_json::json!({"field": "keywords"}))
        );

        let bare: ErrorResponse =
            serde_json::from_str(r#"{"error":"NotFound","message":"No such story"}"#).unwrap();
        assert_eq!(bare.details, None);
        // Without a message it isn't an error body at all.
        assert!(serde_json::from_str::<ErrorResponse>(r#"{"error":"x"}"#).is_err());
    }
}
