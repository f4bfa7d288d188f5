//! `$NAME` substitution over already-split words.

use crate::env::Environment;
use crate::lexer::Token;

/// Marks a word as a variable reference.
pub const SIGIL: char = '$';

/// Replaces every word that starts with [`SIGIL`] by the value of the named
/// variable, or by an empty string when it is unset.
///
/// The mapping is one-to-one: an expanded value is never split into more
/// words and a word never disappears.
pub fn expand(env: &Environment, tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|token| match token.strip_prefix(SIGIL) {
            Some(name) => env.get_var(name).unwrap_or_default(),
            None => token,
        })
        .collect()
}
