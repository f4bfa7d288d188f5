use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Session state shared by the interactive loop and the built-ins.
///
/// The environment contains:
/// - `vars`: a snapshot of the process variables, used for `$NAME` expansion
///   and passed on to spawned programs.
/// - `current_dir`: the working directory; only built-ins such as `cd` change it.
/// - `exit_status`: the status the process exits with once the session halts.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Set by `exit`; reported as the process exit code.
    pub exit_status: u8,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            exit_status: 0,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The user's home directory: `$HOME` if set and non-empty, else the
    /// platform's notion of it.
    pub fn home_dir(&self) -> Option<PathBuf> {
        match self.get_var("HOME") {
            Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
            _ => dirs::home_dir(),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
