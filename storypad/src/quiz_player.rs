//! Plays a [`QuizSession`] on a line-based terminal.
//!
//! Typing an option number selects it, an empty line confirms the selection or moves on to the next
//! question, `r` restarts from the results screen and `q` quits at any time.

use std::io::{BufRead, Write};

use storypad_core::quiz::{Phase, QuizSession};

/// Run until the user quits or input ends. Returns the score, if the quiz was finished.
pub fn play<R, W>(session: &mut QuizSession, input: R, mut output: W) -> std::io::Result<Option<usize>>
where
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        prompt(session, &mut output)?;
        output.flush()?;

        let Some(line) = lines.next().transpose()? else {
            // Out of input, same as quitting.
            return Ok(session.score());
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(session.score());
        }

        match session.phase() {
            Phase::Answering => {
                if line.is_empty() {
                    match session.confirm_answer() {
                        Some(feedback) if feedback.is_correct => {
                            writeln!(output, "Correct!")?;
                            if !feedback.explanation.is_empty() {
                                writeln!(output, "{}", feedback.explanation)?;
                            }
                        }
                        Some(feedback) => {
                            writeln!(
                                output,
                                "Not quite - the answer was {}.",
                                feedback.correct_index + 1
                            )?;
                            if !feedback.explanation.is_empty() {
                                writeln!(output, "{}", feedback.explanation)?;
                            }
                        }
                        None => writeln!(output, "Pick an option first!")?,
                    }
                } else {
                    let accepted = line
                        .parse::<usize>()
                        .ok()
                        .and_then(|number| number.checked_sub(1))
                        .is_some_and(|option| session.select_option(option));
                    if !accepted {
                        writeln!(output, "There's no option {line:?}.")?;
                    }
                }
            }
            Phase::FeedbackShown => {
                session.advance();
            }
            Phase::Completed { .. } => {
                if line.eq_ignore_ascii_case("r") {
                    log::info!("Restarting quiz");
                    session.restart();
                } else {
                    writeln!(output, "Type r to try again or q to quit.")?;
                }
            }
        }
    }
}

fn prompt<W: Write>(session: &QuizSession, output: &mut W) -> std::io::Result<()> {
    let total = session.questions().len();
    match session.phase() {
        Phase::Answering => {
            // Unwrap OK - a question is always current while answering.
            let question = session.current_question().unwrap();
            writeln!(
                output,
                "\nQuestion {} of {total}: {}",
                session.current_index() + 1,
                question.prompt
            )?;
            for (idx, option) in question.options.iter().enumerate() {
                let marker = if session.tentative_selection() == Some(idx) {
                    '>'
                } else {
                    ' '
                };
                writeln!(output, "{marker} {}. {option}", idx + 1)?;
            }
            write!(output, "Pick a number, then press Enter to check: ")
        }
        Phase::FeedbackShown => {
            if session.current_index() + 1 == total {
                write!(output, "Press Enter to see your results: ")
            } else {
                write!(output, "Press Enter for the next question: ")
            }
        }
        Phase::Completed { score } => {
            writeln!(output, "\nYou scored {score} out of {total}!")?;
            // Unwrap OK - completed.
            for (number, result) in session.results().unwrap().enumerate() {
                let mark = if result.is_correct { "right" } else { "wrong" };
                writeln!(output, "  {}. {} ({mark})", number + 1, result.question.prompt)?;
            }
            write!(output, "Try again (r) or quit (q)? ")
        }
    }
}
