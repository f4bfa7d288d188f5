//! A small interactive command shell.
//!
//! Each line read from the terminal is split into words ([`lexer`]), words
//! starting with `$` are replaced by environment variables ([`expand`]), and the
//! first word selects either a built-in command ([`builtin`]) or a program on
//! disk ([`external`]). While a program runs in the foreground the shell stays
//! out of the way of Ctrl-C and Ctrl-Z ([`signals`]).
//!
//! There are no pipelines, redirections, job control or scripting constructs.
//! The main entry point is [`Interpreter`].

pub mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod expand;
pub mod external;
mod interpreter;
pub mod lexer;
pub mod logging;
pub mod prompt;
pub mod signals;

pub use builtin::Builtins;
pub use error::ShellError;
pub use interpreter::{Editor, Input, Interpreter, LineReader, LoopState};
pub use signals::SignalPolicy;
