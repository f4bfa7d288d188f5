//! Errors surfaced by the shell while handling a single input line.
//!
//! Every variant is recoverable: the interactive loop prints it and prompts
//! again. Only a built-in returning `false` ends the session.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::lexer::LexingError;

#[derive(Debug, Error)]
pub enum ShellError {
    /// The input line could not be split into words.
    #[error("parse error: {0}")]
    Parse(#[from] LexingError),

    /// Neither a built-in nor a program found on disk / in `PATH`.
    #[error("{name}: command not found")]
    UnknownCommand { name: String },

    #[error("cd: {}: no such file or directory", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The target exists but the working directory could not be switched to it.
    #[error("cd: {}: {source}", .path.display())]
    ChangeDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cd: HOME not set")]
    HomeNotSet,

    /// A built-in rejected its argument list.
    #[error("{command}: {message}")]
    InvalidArguments {
        command: &'static str,
        message: String,
    },

    /// The program was resolved but could not be started or waited on.
    #[error("{program}: {source}")]
    ExternalProcess {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_thing() {
        let err = ShellError::UnknownCommand {
            name: "frobnicate".to_string(),
        };
        assert_eq!(err.to_string(), "frobnicate: command not found");

        let err = ShellError::DirectoryNotFound {
            path: PathBuf::from("/no/such/dir"),
        };
        assert_eq!(
            err.to_string(),
            "cd: /no/such/dir: no such file or directory"
        );
    }

    #[test]
    fn lexing_errors_convert_into_parse_errors() {
        let err: ShellError = LexingError::UnfinishedQuote.into();
        assert!(matches!(err, ShellError::Parse(LexingError::UnfinishedQuote)));
        assert_eq!(err.to_string(), "parse error: no closing quotation");
    }
}
