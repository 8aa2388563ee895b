//! Scripted drawing, for producing sketches without a pointer device.
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! color #3366FF
//! size 8
//! stroke 10,10 40,12 80,60
//! erase
//! stroke 20,20
//! paint
//! undo
//! redo
//! clear
//! ```

use anyhow::Context;
use smallvec::SmallVec;
use storypad_core::{canvas::BrushMode, color::ColorParseError, drawing::DrawingSession, Color};

#[derive(strum::EnumString, strum::IntoStaticStr, Copy, Clone, PartialEq, Eq, Debug)]
#[strum(serialize_all = "lowercase")]
enum Verb {
    Stroke,
    Color,
    Size,
    Paint,
    Erase,
    Clear,
    Undo,
    Redo,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ScriptCommand {
    Stroke(SmallVec<[[f32; 2]; 16]>),
    Color(Color),
    Size(f32),
    Mode(BrushMode),
    Clear,
    Undo,
    Redo,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ScriptErrorKind {
    #[error("unknown command {0:?}")]
    UnknownVerb(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("{0} takes no arguments")]
    UnexpectedArgument(&'static str),
    #[error("bad point {0:?}, expected x,y")]
    BadPoint(String),
    #[error("bad color: {0}")]
    BadColor(#[from] ColorParseError),
    #[error("bad size {0:?}")]
    BadSize(String),
}
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("line {line}: {kind}")]
pub struct ScriptError {
    pub line: usize,
    pub kind: ScriptErrorKind,
}

/// A parsed command, and the (1-based) line it came from.
#[derive(Clone, PartialEq, Debug)]
pub struct ScriptLine {
    pub line: usize,
    pub command: ScriptCommand,
}

pub fn parse(script: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    script
        .lines()
        .enumerate()
        .filter_map(|(idx, text)| {
            let text = strip_comment(text).trim();
            (!text.is_empty()).then(|| {
                parse_line(text)
                    .map(|command| ScriptLine {
                        line: idx + 1,
                        command,
                    })
                    .map_err(|kind| ScriptError {
                        line: idx + 1,
                        kind,
                    })
            })
        })
        .collect()
}

/// A `#` at the start of a line, or followed by whitespace, begins a comment.
/// Otherwise it's part of a color.
fn strip_comment(text: &str) -> &str {
    if text.trim_start().starts_with('#') {
        return "";
    }
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c == '#' && chars.peek().map_or(true, |(_, next)| next.is_whitespace()) {
            return &text[..idx];
        }
    }
    text
}

fn parse_line(text: &str) -> Result<ScriptCommand, ScriptErrorKind> {
    let mut words = text.split_whitespace();
    // Blank lines are filtered by the caller.
    let verb_word = words.next().unwrap_or_default();
    let verb: Verb = verb_word
        .parse()
        .map_err(|_| ScriptErrorKind::UnknownVerb(verb_word.to_owned()))?;
    let name: &'static str = verb.into();

    let command = match verb {
        Verb::Stroke => {
            let points = words
                .map(parse_point)
                .collect::<Result<SmallVec<_>, _>>()?;
            if points.is_empty() {
                return Err(ScriptErrorKind::MissingArgument(name));
            }
            return Ok(ScriptCommand::Stroke(points));
        }
        Verb::Color => {
            let arg = words.next().ok_or(ScriptErrorKind::MissingArgument(name))?;
            ScriptCommand::Color(arg.parse()?)
        }
        Verb::Size => {
            let arg = words.next().ok_or(ScriptErrorKind::MissingArgument(name))?;
            let size: f32 = arg
                .parse()
                .map_err(|_| ScriptErrorKind::BadSize(arg.to_owned()))?;
            if !(size.is_finite() && size > 0.0) {
                return Err(ScriptErrorKind::BadSize(arg.to_owned()));
            }
            ScriptCommand::Size(size)
        }
        Verb::Paint => ScriptCommand::Mode(BrushMode::Paint),
        Verb::Erase => ScriptCommand::Mode(BrushMode::Erase),
        Verb::Clear => ScriptCommand::Clear,
        Verb::Undo => ScriptCommand::Undo,
        Verb::Redo => ScriptCommand::Redo,
    };
    if words.next().is_some() {
        return Err(ScriptErrorKind::UnexpectedArgument(name));
    }
    Ok(command)
}

fn parse_point(word: &str) -> Result<[f32; 2], ScriptErrorKind> {
    let bad = || ScriptErrorKind::BadPoint(word.to_owned());
    let (x, y) = word.split_once(',').ok_or_else(bad)?;
    let x: f32 = x.trim().parse().map_err(|_| bad())?;
    let y: f32 = y.trim().parse().map_err(|_| bad())?;
    if x.is_finite() && y.is_finite() {
        Ok([x, y])
    } else {
        Err(bad())
    }
}

/// Apply every command to the session, in order.
pub fn run(session: &mut DrawingSession, script: &[ScriptLine]) -> anyhow::Result<()> {
    for ScriptLine { line, command } in script {
        match command {
            ScriptCommand::Stroke(points) => session.draw_stroke(points),
            ScriptCommand::Color(color) => session.brush_mut().set_color(*color),
            ScriptCommand::Size(size) => session
                .brush_mut()
                .set_size(*size)
                .with_context(|| format!("line {line}"))?,
            ScriptCommand::Mode(mode) => session.brush_mut().set_mode(*mode),
            ScriptCommand::Clear => session.clear(),
            ScriptCommand::Undo => {
                if !session.undo() {
                    log::warn!("line {line}: nothing to undo");
                }
            }
            ScriptCommand::Redo => {
                if !session.redo() {
                    log::warn!("line {line}: nothing to redo");
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{parse, run, strip_comment, ScriptCommand, ScriptError, ScriptErrorKind};
    use storypad_core::{
        canvas::BrushMode,
        color::ColorParseError,
        drawing::{DrawingConfig, DrawingSession},
        Color,
    };

    #[test]
    fn parse_commands() {
        let script = parse(
            "# A sketch\n\
             color #FF0000 # red\n\
             \n\
             size 3.5\n\
             stroke 1,2 3.5,4\n\
             erase\n\
             undo # oops\n\
             redo\n\
             clear\n",
        )
        .unwrap();
        let commands: Vec<_> = script.iter().map(|line| line.command.clone()).collect();
        assert_eq!(
            commands,
            [
                ScriptCommand::Color(Color::rgb(255, 0, 0)),
                ScriptCommand::Size(3.5),
                ScriptCommand::Stroke([[1.0, 2.0], [3.5, 4.0]].into_iter().collect()),
                ScriptCommand::Mode(BrushMode::Erase),
                ScriptCommand::Undo,
                ScriptCommand::Redo,
                ScriptCommand::Clear,
            ]
        );
        // Line numbers count comments and blanks.
        assert_eq!(script[0].line, 2);
        assert_eq!(script[1].line, 4);
    }
    #[test]
    fn comments() {
        assert_eq!(strip_comment("# everything"), "");
        assert_eq!(strip_comment("  #everything"), "");
        assert_eq!(strip_comment("color #00FF00 # green"), "color #00FF00 ");
        assert_eq!(strip_comment("color #00FF00#"), "color #00FF00");
        assert_eq!(strip_comment("undo"), "undo");
    }
    #[test]
    fn parse_errors() {
        let error = |script: &str| parse(script).unwrap_err();
        assert_eq!(
            error("undo\nscribble 1,1"),
            ScriptError {
                line: 2,
                kind: ScriptErrorKind::UnknownVerb("scribble".into())
            }
        );
        assert_eq!(
            error("stroke").kind,
            ScriptErrorKind::MissingArgument("stroke")
        );
        assert_eq!(
            error("stroke 1,1 2;2").kind,
            ScriptErrorKind::BadPoint("2;2".into())
        );
        assert_eq!(
            error("color red").kind,
            ScriptErrorKind::BadColor(ColorParseError::MissingHash)
        );
        assert_eq!(error("size -1").kind, ScriptErrorKind::BadSize("-1".into()));
        assert_eq!(
            error("undo twice").kind,
            ScriptErrorKind::UnexpectedArgument("undo")
        );
    }
    #[test]
    fn run_script() {
        let config = DrawingConfig {
            width: 32,
            height: 32,
            ..DrawingConfig::default()
        };
        let mut session = DrawingSession::new(&config).unwrap();
        let script = parse(
            "color #0000FF\n\
             size 4\n\
             stroke 2,16 30,16\n\
             stroke 16,2 16,30\n\
             undo\n\
             undo\n\
             undo\n\
             redo\n",
        )
        .unwrap();
        run(&mut session, &script).unwrap();

        // One stroke redone, the other still undone.
        assert_eq!(session.canvas().pixel(4, 16), Some(Color::rgb(0, 0, 255)));
        assert_eq!(session.canvas().pixel(16, 4), Some(Color::WHITE));
        assert!(session.can_redo());
        assert_eq!(session.brush().size(), 4.0);
    }
}
