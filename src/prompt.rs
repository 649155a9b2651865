//! Where answers to run-time questions come from.
//!
//! Every question the pipeline asks (reference lengths, marker pairs, cutoff,
//! column order, confirmation) goes through an [`InputSource`]. Validation is
//! done by plain parse functions, so the same question can be answered by a
//! terminal, a test script, or the configured defaults.
//!
//! An empty answer always means "accept the suggested default".

use std::collections::VecDeque;
use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

use tracing::{debug, info, warn};

use crate::error::{ExtractError, Result};

/// A supplier of answers.
pub trait InputSource {
    /// Ask `prompt` and wait for one answer line.
    ///
    /// Returns `Ok(None)` when the source is exhausted (end of input).
    fn read_answer(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Whether a rejected answer may be asked again.
    ///
    /// Only sources that can supply a different answer next time should
    /// return `true`.
    fn is_interactive(&self) -> bool;

    /// Show an informational message to whoever is answering.
    fn say(&mut self, _message: &str) {}
}

/// Ask until `parse` accepts the answer.
///
/// Recoverable parse errors lead to the question being asked again, for as
/// long as the source keeps answering. Any other error, a recoverable one on
/// a non-interactive source, or the end of input is returned as is.
pub fn ask_until_valid<T, I, F>(input: &mut I, prompt: &str, mut parse: F) -> Result<T>
where
    I: InputSource + ?Sized,
    F: FnMut(&str) -> Result<T>,
{
    loop {
        let answer = input
            .read_answer(prompt)?
            .ok_or_else(|| ExtractError::InputExhausted {
                prompt: prompt.to_string(),
            })?;

        match parse(answer.trim()) {
            Ok(value) => return Ok(value),
            Err(err) if err.is_recoverable() && input.is_interactive() => {
                warn!(error = %err, "answer rejected");
                input.say(&format!("{}. Check your input and retry.", err));
            }
            Err(err) => return Err(err),
        }
    }
}

/// Whether an answer confirms a yes/no question. Only `y` and `yes` do.
pub fn parse_confirmation(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

// ============================================================================
// Terminal
// ============================================================================

/// Line-based prompting over a reader/writer pair.
///
/// Rejected answers are asked again until the reader runs dry, whether it is
/// a terminal or a pipe.
pub struct TerminalInput<R, W> {
    reader: R,
    writer: W,
    /// Repeat each answer after its prompt, for readers that do not echo
    echo: bool,
}

impl TerminalInput<StdinLock<'static>, Stdout> {
    /// Prompt on stdout and read from stdin.
    ///
    /// Piped answers are echoed so the transcript shows what was answered.
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout(), !atty::is(atty::Stream::Stdin))
    }
}

impl<R: BufRead, W: Write> TerminalInput<R, W> {
    pub fn new(reader: R, writer: W, echo: bool) -> Self {
        Self {
            reader,
            writer,
            echo,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> InputSource for TerminalInput<R, W> {
    fn read_answer(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{} ", prompt)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            writeln!(self.writer)?;
            return Ok(None);
        }
        let answer = line.trim_end_matches(['\r', '\n']).to_string();
        if self.echo {
            writeln!(self.writer, "{}", answer)?;
        }
        Ok(Some(answer))
    }

    fn is_interactive(&self) -> bool {
        true
    }

    fn say(&mut self, message: &str) {
        if let Err(err) = writeln!(self.writer, "{}", message) {
            debug!(error = %err, "could not show message");
        }
    }
}

// ============================================================================
// Scripted
// ============================================================================

/// Answers taken from a fixed list, recording every prompt and message.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    messages: Vec<String>,
    interactive: bool,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            messages: Vec::new(),
            interactive: true,
        }
    }

    /// Treat rejected answers as fatal.
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl InputSource for ScriptedInput {
    fn read_answer(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn say(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// Accepts every default without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptDefaults;

impl InputSource for AcceptDefaults {
    fn read_answer(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(Some(String::new()))
    }

    fn is_interactive(&self) -> bool {
        false
    }

    fn say(&mut self, message: &str) {
        info!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_positive(answer: &str) -> Result<f64> {
        answer
            .parse::<f64>()
            .ok()
            .filter(|v| *v > 0.0)
            .ok_or_else(|| ExtractError::InvalidAnswer {
                answer: answer.to_string(),
                expected: "a positive number".to_string(),
            })
    }

    #[test]
    fn ask_returns_first_valid_answer() {
        let mut input = ScriptedInput::new(["abc", "-1", "4"]);
        let value = ask_until_valid(&mut input, "Cutoff?", parse_positive).unwrap();
        assert_eq!(value, 4.0);
        assert_eq!(input.prompts().len(), 3);
        assert_eq!(input.messages().len(), 2);
    }

    #[test]
    fn non_interactive_source_fails_on_first_bad_answer() {
        let mut input = ScriptedInput::new(["abc", "4"]).non_interactive();
        let err = ask_until_valid(&mut input, "Cutoff?", parse_positive).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidAnswer { .. }));
        assert_eq!(input.remaining(), 1);
    }

    #[test]
    fn exhausted_source_is_an_error() {
        let mut input = ScriptedInput::new(Vec::<String>::new());
        let err = ask_until_valid(&mut input, "Cutoff?", parse_positive).unwrap_err();
        assert!(matches!(err, ExtractError::InputExhausted { prompt } if prompt == "Cutoff?"));
    }

    #[test]
    fn fatal_errors_are_not_retried() {
        let mut input = ScriptedInput::new(["x", "y"]);
        let err = ask_until_valid(&mut input, "Order?", |_| -> Result<()> {
            Err(ExtractError::ColumnCountMismatch {
                expected: 2,
                found: 1,
            })
        })
        .unwrap_err();
        assert!(matches!(err, ExtractError::ColumnCountMismatch { .. }));
        assert_eq!(input.prompts().len(), 1);
    }

    #[test]
    fn answers_are_trimmed() {
        let mut input = ScriptedInput::new(["  7.5 \t"]);
        assert_eq!(
            ask_until_valid(&mut input, "?", parse_positive).unwrap(),
            7.5
        );
    }

    #[test]
    fn accept_defaults_answers_empty() {
        let mut input = AcceptDefaults;
        assert_eq!(input.read_answer("?").unwrap(), Some(String::new()));
        assert!(!input.is_interactive());
    }

    #[test]
    fn terminal_input_writes_prompt_and_reads_line() {
        let mut terminal = TerminalInput::new("9.5 mm\r\n".as_bytes(), Vec::new(), false);
        let answer = terminal.read_answer("Length?").unwrap();
        assert_eq!(answer.as_deref(), Some("9.5 mm"));
        assert_eq!(terminal.read_answer("Again?").unwrap(), None);

        let written = String::from_utf8(terminal.into_writer()).unwrap();
        assert_eq!(written, "Length? Again? \n");
    }

    #[test]
    fn terminal_input_echoes_piped_answers() {
        let mut terminal = TerminalInput::new("4\n".as_bytes(), Vec::new(), true);
        assert_eq!(terminal.read_answer("Cutoff?").unwrap().as_deref(), Some("4"));
        let written = String::from_utf8(terminal.into_writer()).unwrap();
        assert_eq!(written, "Cutoff? 4\n");
    }

    #[test]
    fn piped_reader_is_asked_again_after_a_bad_answer() {
        let mut terminal = TerminalInput::new("a lot\n4\n".as_bytes(), Vec::new(), true);
        let value = ask_until_valid(&mut terminal, "Cutoff?", parse_positive).unwrap();
        assert_eq!(value, 4.0);

        let written = String::from_utf8(terminal.into_writer()).unwrap();
        assert_eq!(written.matches("Cutoff?").count(), 2);
        assert!(written.contains("Could not understand 'a lot'"));
    }

    #[test]
    fn piped_reader_running_dry_is_an_error() {
        let mut terminal = TerminalInput::new("a lot\n".as_bytes(), Vec::new(), true);
        let err = ask_until_valid(&mut terminal, "Cutoff?", parse_positive).unwrap_err();
        assert!(matches!(err, ExtractError::InputExhausted { .. }));
    }

    #[test]
    fn accept_defaults_never_retries() {
        let mut input = AcceptDefaults;
        let err = ask_until_valid(&mut input, "Cutoff?", parse_positive).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidAnswer { .. }));
    }

    #[test]
    fn confirmation_accepts_only_yes() {
        assert!(parse_confirmation("y"));
        assert!(parse_confirmation("Y"));
        assert!(parse_confirmation(" yes "));
        assert!(!parse_confirmation(""));
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation("sure"));
    }
}
