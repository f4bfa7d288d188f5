use crate::command::Invocation;
use crate::env::Environment;
use crate::error::ShellError;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// A program on disk together with the argument vector to start it with.
#[derive(Debug)]
pub struct ExternalCommand {
    program: PathBuf,
    invocation: Invocation,
}

impl ExternalCommand {
    /// Looks up the program named by `invocation` relative to the session's
    /// working directory and `PATH`.
    pub fn resolve(env: &Environment, invocation: Invocation) -> Result<Self, ShellError> {
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let found = find_command_path(
            OsStr::new(&search_paths),
            &env.current_dir,
            Path::new(&invocation.name),
        );
        match found {
            Some(program) => Ok(Self {
                program,
                invocation,
            }),
            None => Err(ShellError::UnknownCommand {
                name: invocation.name,
            }),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Starts the program with inherited standard streams and blocks until it exits.
    pub fn run(self, env: &Environment) -> Result<ExitStatus, ShellError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.invocation.args)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&self.invocation.name);
        }

        let process_error = |source| ShellError::ExternalProcess {
            program: self.invocation.name.clone(),
            source,
        };
        let mut child = cmd.spawn().map_err(process_error)?;
        debug!(pid = child.id(), "spawned");
        child.wait().map_err(process_error)
    }
}

/// Locates the program a command name refers to.
///
/// A bare name (`ls`) is searched for in each directory of `search_paths`,
/// first regular file wins. Anything with a separator (`bin/tool`, `./tool`,
/// `/usr/bin/tool`) is a path: absolute ones are taken as is, relative ones
/// are joined onto `cwd`. Paths only need to exist; whether they can be
/// executed is up to the spawn.
pub fn find_command_path(search_paths: &OsStr, cwd: &Path, name: &Path) -> Option<PathBuf> {
    let mut components = name.components();
    let candidate = match (components.next(), components.next()) {
        (None, _) => return None,
        (Some(Component::Normal(bare)), None) => return find_in_path(search_paths, bare),
        _ if name.is_absolute() => name.to_path_buf(),
        _ => cwd.join(name),
    };
    candidate.exists().then_some(candidate)
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| candidate.is_file())
}
