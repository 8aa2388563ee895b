#![warn(clippy::pedantic)]

mod quiz_player;
mod settings;
mod sketch;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result as AnyResult};
use clap::{Parser, Subcommand};
use storypad_core::{
    canvas::Snapshot,
    drawing::DrawingSession,
    quiz::{QuizPayload, QuizSession},
    story::{AudioRequest, InputType, StoryRequest, StoryResponse},
};

use settings::{LoadState, Preferences};

#[derive(Parser, Debug)]
#[command(name = "storypad", version)]
struct Cli {
    /// Preferences file to use instead of the one in the user's preference directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a quiz in the terminal.
    Quiz(QuizArgs),
    /// Draw a sketch from a script of strokes.
    Sketch(SketchArgs),
    /// Build a story request from keywords.
    Keywords(KeywordsArgs),
    /// Build a narration request for a generated story.
    Audio(AudioArgs),
}

#[derive(Parser, Debug)]
struct QuizArgs {
    /// Quiz JSON, or a story JSON with a quiz attached.
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct SketchArgs {
    /// Drawing script.
    script: PathBuf,

    /// Output PNG path.
    #[arg(long, default_value = "sketch.png")]
    out: PathBuf,

    /// Also write a story request JSON for the finished sketch.
    #[arg(long)]
    request: Option<PathBuf>,

    /// PNG to draw on top of, instead of a blank canvas.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Kind of image, for the story request.
    #[arg(long, default_value = "sketch")]
    input_type: InputType,
}

#[derive(Parser, Debug)]
struct KeywordsArgs {
    /// Story topic, in a few words.
    keywords: String,

    /// Output JSON path. Printed if not given.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AudioArgs {
    /// Story response JSON.
    story: PathBuf,

    /// Output JSON path. Printed if not given.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let cli = Cli::parse();
    let preferences = load_preferences(cli.config.as_deref());

    match cli.cmd {
        Command::Quiz(args) => quiz(&args),
        Command::Sketch(args) => sketch(&args, &preferences),
        Command::Keywords(args) => {
            let request = StoryRequest::keywords(
                &args.keywords,
                preferences.story.age_group,
                &preferences.story.language,
            );
            request.validate()?;
            write_json(&request, args.out.as_deref())
        }
        Command::Audio(args) => {
            let story = StoryResponse::from_json(&read_text(&args.story)?)
                .with_context(|| format!("reading story {:?}", args.story))?;
            let request = AudioRequest::for_story(&story, &preferences.story.language);
            request.validate()?;
            write_json(&request, args.out.as_deref())
        }
    }
}

/// Load preferences from `path`, or the default location. A missing default file is written out so
/// the user has something to edit.
fn load_preferences(path: Option<&Path>) -> Preferences {
    match path {
        Some(path) => load_preferences_at(path, false),
        None => match Preferences::default_path() {
            Some(path) => load_preferences_at(&path, true),
            None => {
                log::warn!("No preference directory, using defaults");
                Preferences::default()
            }
        },
    }
}

/// Load from `path`. If `write_missing`, a missing file is created with the defaults. A file that
/// exists but fails to load is never touched.
fn load_preferences_at(path: &Path, write_missing: bool) -> Preferences {
    let (preferences, state) = Preferences::load_or_default(path);
    if state == LoadState::Missing && write_missing {
        if let Err(e) = preferences.save(path) {
            log::warn!("Failed to save preferences:\n{e:?}");
        }
    }
    preferences
}

fn read_text(path: &Path) -> AnyResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {path:?}"))
}

fn write_json<T: serde::Serialize>(value: &T, out: Option<&Path>) -> AnyResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {path:?}"))?;
            log::info!("Wrote {path:?}");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Contents of a file given to `storypad quiz`.
enum QuizFile {
    /// A generated story, which is shown before its quiz.
    Story(Box<StoryResponse>),
    Quiz(QuizPayload),
}
impl QuizFile {
    /// Stories are told apart from bare quizzes by their `title` and `content`, so that errors come
    /// from the parser the file was meant for.
    fn parse(text: &str) -> AnyResult<Self> {
        let is_story = serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .and_then(|value| {
                let object = value.as_object()?;
                Some(object.contains_key("title") || object.contains_key("content"))
            })
            .unwrap_or(false);
        if is_story {
            let story = StoryResponse::from_json(text).context("malformed story json")?;
            Ok(Self::Story(Box::new(story)))
        } else {
            Ok(Self::Quiz(QuizPayload::from_json(text)?))
        }
    }
    fn into_session(self) -> AnyResult<QuizSession> {
        match self {
            Self::Story(story) => story.quiz_session()?.context("story has no quiz"),
            Self::Quiz(payload) => Ok(payload.into_session()?),
        }
    }
}

fn quiz(args: &QuizArgs) -> AnyResult<()> {
    let file = QuizFile::parse(&read_text(&args.file)?)
        .with_context(|| format!("loading {:?}", args.file))?;
    if let QuizFile::Story(story) = &file {
        println!("{}\n\n{}\n", story.title, story.content);
    }
    let mut session = file
        .into_session()
        .with_context(|| format!("loading {:?}", args.file))?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    match quiz_player::play(&mut session, stdin.lock(), stdout.lock())? {
        Some(score) => log::info!("Finished with {score}/{}", session.questions().len()),
        None => log::info!("Quit before finishing"),
    }
    Ok(())
}

fn sketch(args: &SketchArgs, preferences: &Preferences) -> AnyResult<()> {
    let script = sketch::parse(&read_text(&args.script)?)
        .with_context(|| format!("parsing {:?}", args.script))?;
    let config = preferences.drawing_config()?;

    let mut session = match &args.background {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {path:?}"))?;
            let image =
                Snapshot::decode_png(&bytes).with_context(|| format!("decoding {path:?}"))?;
            DrawingSession::from_image(&image, &config)
        }
        None => DrawingSession::new(&config)?,
    };
    sketch::run(&mut session, &script)?;

    let png = session.canvas().snapshot().encode_png()?;
    std::fs::write(&args.out, png).with_context(|| format!("writing {:?}", args.out))?;
    log::info!("Wrote {:?}", args.out);

    if let Some(path) = &args.request {
        let request = session.to_story_request(
            args.input_type,
            preferences.story.age_group,
            &preferences.story.language,
        )?;
        request.validate()?;
        write_json(&request, Some(path))?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{load_preferences_at, QuizFile};
    use crate::settings::Preferences;

    const QUESTION: &str = r#"{"question":"Where did the cat go?","options":["The moon","The sea"],"correct_answer":0}"#;

    fn story(quiz: &str) -> String {
        format!(
            r#"{{
                "story_id": "abc",
                "title": "The Moon Cat",
                "content": "Once upon a time...",
                "summary": "A cat visits the moon.",
                "age_group": "5-7",
                "word_count": 4,
                "quiz": {quiz}
            }}"#
        )
    }
    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("storypad-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn quiz_file_kinds() {
        let bare = format!(r#"{{"questions":[{QUESTION}]}}"#);
        let file = QuizFile::parse(&bare).unwrap();
        assert!(matches!(file, QuizFile::Quiz(_)));
        assert_eq!(file.into_session().unwrap().questions().len(), 1);

        // Fenced quizzes aren't valid json until unwrapped, and are still quizzes.
        let fenced = format!("```json\n{bare}\n```");
        assert!(matches!(QuizFile::parse(&fenced).unwrap(), QuizFile::Quiz(_)));

        let file = QuizFile::parse(&story(&format!(r#"{{"questions":[{QUESTION}]}}"#))).unwrap();
        let QuizFile::Story(parsed) = &file else {
            panic!("story parsed as a bare quiz");
        };
        assert_eq!(parsed.title, "The Moon Cat");
        assert_eq!(file.into_session().unwrap().questions().len(), 1);
    }
    #[test]
    fn story_errors_are_reported() {
        // Quiz question without its answer.
        let broken = story(r#"{"questions":[{"question":"?","options":["a","b"]}]}"#);
        let message = format!("{:#}", QuizFile::parse(&broken).err().unwrap());
        assert!(message.contains("malformed story json"), "{message}");
        assert!(message.contains("correct_answer"), "{message}");
        assert!(!message.contains("missing field `questions`"), "{message}");

        let quizless = story("null");
        let message = format!(
            "{:#}",
            QuizFile::parse(&quizless).unwrap().into_session().err().unwrap()
        );
        assert_eq!(message, "story has no quiz");
    }
    #[test]
    fn missing_default_preferences_written() {
        let dir = temp_dir("default-prefs");
        let path = dir.join("preferences.toml");

        assert_eq!(load_preferences_at(&path, true), Preferences::default());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
    #[test]
    fn explicit_preferences_not_written() {
        let dir = temp_dir("explicit-prefs");
        let path = dir.join("preferences.toml");

        assert_eq!(load_preferences_at(&path, false), Preferences::default());
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
    #[test]
    fn malformed_preferences_left_alone() {
        let dir = temp_dir("malformed-prefs");
        let path = dir.join("preferences.toml");
        std::fs::write(&path, "[canvas\nwidth = ").unwrap();

        assert_eq!(load_preferences_at(&path, true), Preferences::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[canvas\nwidth = ");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
