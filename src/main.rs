use anyhow::Context;
use minish::config::ShellConfig;
use minish::{Builtins, Editor, Interpreter, SignalPolicy, logging};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let config = ShellConfig::load().unwrap_or_else(|err| {
        eprintln!("minish: {err}; using default settings");
        ShellConfig::default()
    });
    logging::init_tracing(&config.log);

    let signals = SignalPolicy::install().context("failed to install signal handlers")?;
    let mut editor = Editor::new().context("failed to open the terminal line editor")?;

    let mut shell = Interpreter::new(Builtins::default(), signals, config.prompt);
    shell
        .repl(&mut editor, &mut std::io::stdout())
        .context("input stream failed")?;

    Ok(ExitCode::from(shell.exit_status()))
}
