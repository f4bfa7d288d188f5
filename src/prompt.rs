use crate::config::ColorMode;
use crate::env::Environment;
use std::fmt;
use std::path::Path;

const YELLOW_BOLD: &str = "\x1b[1;33m";
const CYAN_BOLD: &str = "\x1b[1;36m";
const RESET: &str = "\x1b[0;0m";

/// The `[user@host dir] $ ` line shown before every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub user: String,
    pub host: String,
    pub dir: String,
    pub colored: bool,
}

impl Prompt {
    /// Builds the prompt from the session state and the local machine.
    pub fn capture(env: &Environment, color: ColorMode) -> Self {
        let home = env.home_dir();
        Self {
            user: user_name(env),
            host: host_name(env),
            dir: short_dir(&env.current_dir, home.as_deref()),
            colored: color.enabled(),
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.colored {
            write!(
                f,
                "[{YELLOW_BOLD}{}{RESET}@{} {CYAN_BOLD}{}{RESET}] $ ",
                self.user, self.host, self.dir
            )
        } else {
            write!(f, "[{}@{} {}] $ ", self.user, self.host, self.dir)
        }
    }
}

/// `~` for the home directory, otherwise the last component of `cwd`.
pub fn short_dir(cwd: &Path, home: Option<&Path>) -> String {
    if home.is_some_and(|home| home == cwd) {
        return "~".to_string();
    }
    match cwd.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => cwd.to_string_lossy().into_owned(),
    }
}

fn user_name(env: &Environment) -> String {
    ["LOGNAME", "USER", "LNAME", "USERNAME"]
        .iter()
        .filter_map(|key| env.get_var(key))
        .find(|name| !name.is_empty())
        .or_else(passwd_user_name)
        .unwrap_or_else(|| "user".to_string())
}

#[cfg(unix)]
fn passwd_user_name() -> Option<String> {
    // SAFETY: getpwuid returns either null or a pointer to a static record
    // that stays valid until the next getpw* call; we copy the name out at once.
    unsafe {
        let pw = libc::getpwuid(libc::getuid());
        if pw.is_null() || (*pw).pw_name.is_null() {
            return None;
        }
        let name = std::ffi::CStr::from_ptr((*pw).pw_name);
        Some(name.to_string_lossy().into_owned())
    }
}

#[cfg(not(unix))]
fn passwd_user_name() -> Option<String> {
    None
}

#[cfg(unix)]
fn host_name(_env: &Environment) -> String {
    let mut buf = [0u8; 256];
    // SAFETY: the buffer is valid for `buf.len()` bytes.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
    if rc != 0 {
        return "localhost".to_string();
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    if end == 0 {
        return "localhost".to_string();
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[cfg(not(unix))]
fn host_name(env: &Environment) -> String {
    env.get_var("COMPUTERNAME")
        .unwrap_or_else(|| "localhost".to_string())
}
