//! Lexical analysis of a command line into shell words.
//!
//! Splitting follows POSIX shell rules: whitespace separates words, single
//! quotes preserve everything literally, double quotes preserve everything
//! except `\"` and `\\`, and an unquoted backslash takes the next character
//! literally. Adjacent quoted and unquoted runs form a single word.

use thiserror::Error;

/// A single shell word with all quoting removed.
pub type Token = String;

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("no closing quotation")]
    UnfinishedQuote,
    /// The line ended right after a backslash.
    #[error("no escaped character")]
    DanglingEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeFrom {
    Word,
    DoubleQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
    Escape(EscapeFrom),
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    // Set once the current word contains a quoted run, so `''` still yields a word.
    quoted: bool,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
            quoted: false,
        }
    }

    /// Runs the machine over the whole input and returns the words in order.
    fn make_tokens(&mut self) -> Result<Vec<Token>, LexingError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch),
                LexingState::Escape(from) => self.handle_escape(ch, from),
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                return Err(LexingError::UnfinishedQuote);
            }
            LexingState::Escape(_) => return Err(LexingError::DanglingEscape),
            LexingState::Start | LexingState::ReadingWord => {}
        }

        self.finish_word(&mut out);
        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn handle_start(&mut self, ch: char) {
        if is_separator(ch) {
            return;
        }
        self.state = LexingState::ReadingWord;
        self.begin_run(ch);
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<Token>) {
        if is_separator(ch) {
            self.finish_word(out);
            self.state = LexingState::Start;
        } else {
            self.begin_run(ch);
        }
    }

    /// Shared by `Start` and `ReadingWord`: opens a quote, an escape, or
    /// appends a plain character to the current word.
    fn begin_run(&mut self, ch: char) {
        match ch {
            '\'' => {
                self.quoted = true;
                self.state = LexingState::ReadingSingleQuote;
            }
            '"' => {
                self.quoted = true;
                self.state = LexingState::ReadingDoubleQuote;
            }
            '\\' => self.state = LexingState::Escape(EscapeFrom::Word),
            c => self.buffer.push(c),
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => self.state = LexingState::Escape(EscapeFrom::DoubleQuote),
            c => self.buffer.push(c),
        }
    }

    fn handle_escape(&mut self, ch: char, from: EscapeFrom) {
        match from {
            EscapeFrom::Word => {
                self.buffer.push(ch);
                self.state = LexingState::ReadingWord;
            }
            EscapeFrom::DoubleQuote => {
                // Inside double quotes only the quote and the backslash itself are escapable.
                if ch != '"' && ch != '\\' {
                    self.buffer.push('\\');
                }
                self.buffer.push(ch);
                self.state = LexingState::ReadingDoubleQuote;
            }
        }
    }

    fn finish_word(&mut self, out: &mut Vec<Token>) {
        if !self.buffer.is_empty() || self.quoted {
            out.push(std::mem::take(&mut self.buffer));
        }
        self.quoted = false;
    }
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

/// Splits `line` into shell words.
///
/// Returns an empty vector for an empty or whitespace-only line, and
/// [`LexingError`] when a quote is left open or the line ends in a lone
/// backslash.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LexingError> {
    let mut lexer = LexingFSM::new(line);
    lexer.make_tokens()
}
