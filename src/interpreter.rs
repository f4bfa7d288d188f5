use crate::builtin::Builtins;
use crate::command::Invocation;
use crate::config::PromptConfig;
use crate::env::Environment;
use crate::error::ShellError;
use crate::expand;
use crate::external::ExternalCommand;
use crate::lexer;
use crate::prompt::Prompt;
use crate::signals::SignalPolicy;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// Name of the built-in run when input ends.
const EXIT_BUILTIN: &str = "exit";

/// One read from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C while editing the line.
    Interrupted,
    /// Ctrl-D or closed input.
    Eof,
}

/// Source of command lines. Failing here ends the session.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Input>;
}

/// Terminal line editor backed by [`rustyline`]. History is not kept.
pub struct Editor {
    inner: DefaultEditor,
}

impl Editor {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            inner: DefaultEditor::new()?,
        })
    }
}

impl LineReader for Editor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Input> {
        match self.inner.readline(prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::other(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Halted,
}

impl From<bool> for LoopState {
    fn from(keep_running: bool) -> Self {
        if keep_running {
            LoopState::Running
        } else {
            LoopState::Halted
        }
    }
}

/// The interactive shell: reads lines, expands them and runs built-ins or
/// external programs until a built-in asks it to stop.
///
/// Example
/// ```no_run
/// use minish::{Builtins, Editor, Interpreter, SignalPolicy};
/// let signals = SignalPolicy::install().unwrap();
/// let mut sh = Interpreter::new(Builtins::default(), signals, Default::default());
/// sh.repl(&mut Editor::new().unwrap(), &mut std::io::stdout()).unwrap();
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: Builtins,
    signals: SignalPolicy,
    prompt: PromptConfig,
}

impl Interpreter {
    pub fn new(builtins: Builtins, signals: SignalPolicy, prompt: PromptConfig) -> Self {
        Self {
            env: Environment::new(),
            builtins,
            signals,
            prompt,
        }
    }

    /// Status the process should exit with after [`Interpreter::repl`] returns.
    pub fn exit_status(&self) -> u8 {
        self.env.exit_status
    }

    /// Runs the read-eval loop until a built-in returns `false`.
    ///
    /// Command failures are written to `out` and the loop carries on. Only a
    /// failure of the input source or of `out` itself is returned.
    pub fn repl<R, W>(&mut self, reader: &mut R, out: &mut W) -> io::Result<()>
    where
        R: LineReader,
        W: Write,
    {
        let mut state = LoopState::Running;
        while state == LoopState::Running {
            let prompt = Prompt::capture(&self.env, self.prompt.color).to_string();
            if self.signals.reset() {
                writeln!(out)?;
            }
            out.flush()?;

            let line = match reader.read_line(&prompt)? {
                Input::Line(line) => line,
                Input::Interrupted => continue,
                Input::Eof => {
                    writeln!(out)?;
                    state = self.end_of_input(out);
                    continue;
                }
            };

            state = match self.execute_line(&line, out) {
                Ok(next) => next,
                Err(err) => {
                    warn!(error = %err, "command failed");
                    writeln!(out, "{err}")?;
                    LoopState::Running
                }
            };
        }
        info!(status = self.env.exit_status, "session halted");
        Ok(())
    }

    /// Tokenizes, expands and dispatches one input line.
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Result<LoopState, ShellError> {
        let tokens = lexer::tokenize(line)?;
        debug!(?tokens, "tokenized");
        let tokens = expand::expand(&self.env, tokens);
        match Invocation::from_tokens(tokens) {
            Some(invocation) => self.dispatch(invocation, out),
            None => Ok(LoopState::Running),
        }
    }

    /// Built-ins take precedence; everything else is run as a program in the
    /// foreground.
    fn dispatch(&mut self, invocation: Invocation, out: &mut dyn Write) -> Result<LoopState, ShellError> {
        if let Some(handler) = self.builtins.resolve(&invocation.name) {
            debug!(name = %invocation.name, "running built-in");
            let keep_running = handler(&invocation.args, &mut self.env, out)?;
            return Ok(keep_running.into());
        }

        let command = ExternalCommand::resolve(&self.env, invocation)?;
        debug!(program = %command.program().display(), "running program");
        out.flush()?;
        self.signals.enter_foreground()?;
        let status = command.run(&self.env)?;
        debug!(%status, "program finished");
        Ok(LoopState::Running)
    }

    /// End of input behaves like typing `exit`.
    fn end_of_input(&mut self, out: &mut dyn Write) -> LoopState {
        if self.builtins.resolve(EXIT_BUILTIN).is_none() {
            return LoopState::Halted;
        }
        match self.builtins.call(EXIT_BUILTIN, &[], &mut self.env, out) {
            Ok(keep_running) => keep_running.into(),
            Err(err) => {
                warn!(error = %err, "exit built-in failed at end of input");
                LoopState::Halted
            }
        }
    }
}
