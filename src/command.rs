use crate::lexer::Token;

/// A resolved command line: the command name and its arguments.
///
/// Built fresh for every line the shell reads and dropped once the command
/// has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Splits expanded words into name and arguments.
    ///
    /// Returns `None` for an empty word list; such a line is never dispatched.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Option<Self> {
        if tokens.is_empty() {
            return None;
        }
        let args = tokens.split_off(1);
        let name = tokens.pop()?;
        Some(Self { name, args })
    }

    /// The full argument vector, command name first.
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.args.iter().map(String::as_str))
    }
}
