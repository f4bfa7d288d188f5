use crate::env::Environment;
use crate::error::ShellError;
use argh::{EarlyExit, FromArgs};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Uniform entry point of a built-in: takes the argument list (without the
/// command name) and returns whether the shell should keep running.
pub type Handler = fn(&[String], &mut Environment, &mut dyn Write) -> Result<bool, ShellError>;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command, writing any output to `out`.
    ///
    /// Returns `false` to end the session.
    fn execute(self, env: &mut Environment, out: &mut dyn Write) -> Result<bool, ShellError>;
}

fn invoke<T: BuiltinCommand>(
    args: &[String],
    env: &mut Environment,
    out: &mut dyn Write,
) -> Result<bool, ShellError> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match T::from_args(&[T::name()], &args) {
        Ok(cmd) => cmd.execute(env, out),
        // `--help` and friends: print and carry on.
        Err(EarlyExit {
            output,
            status: Ok(()),
        }) => {
            writeln!(out, "{}", output.trim_end())?;
            Ok(true)
        }
        Err(EarlyExit {
            output,
            status: Err(()),
        }) => Err(ShellError::InvalidArguments {
            command: T::name(),
            message: output.trim_end().to_string(),
        }),
    }
}

fn candidate<T: BuiltinCommand>() -> (&'static str, Handler) {
    let handler: Handler = invoke::<T>;
    (T::name(), handler)
}

/// Every built-in this shell ships with, in registration order.
pub fn capabilities() -> Vec<(&'static str, Handler)> {
    vec![
        candidate::<Cd>(),
        candidate::<Exit>(),
        candidate::<Pwd>(),
        candidate::<Echo>(),
    ]
}

/// Name to handler table, fixed once constructed.
pub struct Builtins {
    handlers: HashMap<&'static str, Handler>,
}

impl Builtins {
    /// Registers each candidate under its name. When two candidates share a
    /// name the later one wins.
    pub fn register_all<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Handler)>,
    {
        let mut handlers = HashMap::new();
        for (name, handler) in candidates {
            if handlers.insert(name, handler).is_some() {
                debug!(name, "built-in replaced by a later registration");
            }
        }
        Self { handlers }
    }

    pub fn resolve(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).copied()
    }

    /// Runs the built-in `name`, failing with [`ShellError::UnknownCommand`]
    /// if there is none.
    pub fn call(
        &self,
        name: &str,
        args: &[String],
        env: &mut Environment,
        out: &mut dyn Write,
    ) -> Result<bool, ShellError> {
        let handler = self
            .resolve(name)
            .ok_or_else(|| ShellError::UnknownCommand {
                name: name.to_string(),
            })?;
        handler(args, env, out)
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::register_all(capabilities())
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the home directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, env: &mut Environment, _out: &mut dyn Write) -> Result<bool, ShellError> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => env.home_dir().ok_or(ShellError::HomeNotSet)?,
        };

        let new_dir = if target.is_absolute() {
            target.clone()
        } else {
            env.current_dir.join(&target)
        };

        if !new_dir.exists() {
            return Err(ShellError::DirectoryNotFound { path: target });
        }

        let canonical = fs::canonicalize(&new_dir).map_err(|source| {
            ShellError::ChangeDirectory {
                path: target.clone(),
                source,
            }
        })?;

        env::set_current_dir(&canonical).map_err(|source| ShellError::ChangeDirectory {
            path: target.clone(),
            source,
        })?;
        debug!(dir = %canonical.display(), "changed directory");
        env.current_dir = canonical;
        Ok(true)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional)]
    /// status to exit the shell process with. Defaults to 0.
    pub status: Option<u8>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, env: &mut Environment, _out: &mut dyn Write) -> Result<bool, ShellError> {
        if let Some(status) = self.status {
            env.exit_status = status;
        }
        Ok(false)
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, env: &mut Environment, out: &mut dyn Write) -> Result<bool, ShellError> {
        writeln!(out, "{}", env.current_dir.to_string_lossy())?;
        Ok(true)
    }
}

#[derive(FromArgs)]
/// write the arguments to standard output, separated by spaces.
/// by default, a trailing newline is printed.
pub struct Echo {
    #[argh(switch, short = 'n')]
    /// do not output the trailing newline.
    pub no_newline: bool,

    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, _env: &mut Environment, out: &mut dyn Write) -> Result<bool, ShellError> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(out, "{}", s)?;
        } else {
            writeln!(out, "{}", s)?;
        }
        out.flush()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lock_current_dir;
    use std::collections::HashMap;
    use std::env as stdenv;

    fn test_env() -> Environment {
        Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
            exit_status: 0,
        }
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn always_stop(_: &[String], _: &mut Environment, _: &mut dyn Write) -> Result<bool, ShellError> {
        Ok(false)
    }

    #[test]
    fn test_default_registry_has_every_builtin() {
        let builtins = Builtins::default();
        for name in ["cd", "exit", "pwd", "echo"] {
            assert!(builtins.resolve(name).is_some(), "missing builtin {name}");
        }
        assert!(builtins.resolve("ls").is_none());
    }

    #[test]
    fn test_later_registration_wins() {
        let mut candidates = capabilities();
        candidates.push(("pwd", always_stop as Handler));
        let builtins = Builtins::register_all(candidates);

        let mut env = test_env();
        let keep_running = builtins.call("pwd", &[], &mut env, &mut Vec::new()).unwrap();
        assert!(!keep_running);
    }

    #[test]
    fn test_call_unknown_name_fails() {
        let builtins = Builtins::default();
        let err = builtins
            .call("nope", &[], &mut test_env(), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, ShellError::UnknownCommand { name } if name == "nope"));
    }

    #[test]
    fn test_pwd_prints_current_dir() {
        let _lock = lock_current_dir();
        let cur = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let mut out = Vec::new();
        let res = Builtins::default().call("pwd", &[], &mut env, &mut out);

        assert!(res.unwrap());
        let expected = format!("{}\n", cur.to_string_lossy());
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_echo_with_and_without_newline() {
        let builtins = Builtins::default();
        let mut env = test_env();

        let mut out1 = Vec::new();
        assert!(builtins.call("echo", &args(&["hello", "world"]), &mut env, &mut out1).unwrap());
        assert_eq!(String::from_utf8(out1).unwrap(), "hello world\n");

        let mut out2 = Vec::new();
        assert!(builtins.call("echo", &args(&["-n", "foo", "bar"]), &mut env, &mut out2).unwrap());
        assert_eq!(String::from_utf8(out2).unwrap(), "foo bar");
    }

    #[test]
    fn test_exit_stops_and_records_status() {
        let builtins = Builtins::default();
        let mut env = test_env();

        assert!(!builtins.call("exit", &[], &mut env, &mut Vec::new()).unwrap());
        assert_eq!(env.exit_status, 0);

        assert!(!builtins.call("exit", &args(&["3"]), &mut env, &mut Vec::new()).unwrap());
        assert_eq!(env.exit_status, 3);
    }

    #[test]
    fn test_bad_arguments_are_reported() {
        let builtins = Builtins::default();
        let mut env = test_env();

        let err = builtins
            .call("exit", &args(&["lots"]), &mut env, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, ShellError::InvalidArguments { command: "exit", .. }));
    }

    #[test]
    fn test_help_prints_usage_and_continues() {
        let builtins = Builtins::default();
        let mut out = Vec::new();
        let keep_running = builtins
            .call("cd", &args(&["--help"]), &mut test_env(), &mut out)
            .unwrap();
        assert!(keep_running);
        assert!(String::from_utf8(out).unwrap().contains("Usage: cd"));
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let canonical_temp = fs::canonicalize(temp.path()).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let target = canonical_temp.to_string_lossy().to_string();
        let res = Builtins::default().call("cd", &[target], &mut env, &mut Vec::new());
        let new_cwd = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&orig).expect("failed to restore cwd");

        assert!(res.unwrap());
        assert_eq!(fs::canonicalize(new_cwd).unwrap(), canonical_temp);
        assert_eq!(env.current_dir, canonical_temp);
    }

    #[test]
    fn test_cd_to_home_when_none() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let canonical_temp = fs::canonicalize(temp.path()).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();

        let mut env = test_env();
        env.set_var("HOME", canonical_temp.to_string_lossy().to_string());

        let res = Builtins::default().call("cd", &[], &mut env, &mut Vec::new());
        let new_cwd = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&orig).expect("failed to restore cwd");

        assert!(res.unwrap());
        assert_eq!(fs::canonicalize(new_cwd).unwrap(), canonical_temp);
        assert_eq!(env.current_dir, canonical_temp);
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let name = format!("nonexistent_dir_for_minish_test_{}", std::process::id());
        let err = Builtins::default()
            .call("cd", &[name.clone()], &mut env, &mut Vec::new())
            .unwrap_err();

        assert!(matches!(err, ShellError::DirectoryNotFound { path } if path == PathBuf::from(name)));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(env.current_dir, orig);
    }

    #[test]
    fn test_cd_into_a_file_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let file = tempfile::NamedTempFile::new().expect("create temp file");
        let mut env = test_env();

        let target = file.path().to_string_lossy().to_string();
        let err = Builtins::default()
            .call("cd", &[target], &mut env, &mut Vec::new())
            .unwrap_err();

        assert!(matches!(err, ShellError::ChangeDirectory { .. }));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }
}
