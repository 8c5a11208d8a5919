// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! POSIX-ish argv splitting: whitespace separates arguments, single
//! quotes preserve content literally, double quotes process a small
//! escape set. No variable or command substitution — by the time a
//! `cmd` template reaches this module, `${...}` placeholders have
//! already been expanded by [`crate::template::expand`].

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("unterminated single-quoted string starting at byte {0}")]
    UnterminatedSingleQuote(usize),
    #[error("unterminated double-quoted string starting at byte {0}")]
    UnterminatedDoubleQuote(usize),
    #[error("trailing backslash at byte {0}")]
    TrailingBackslash(usize),
    #[error("invalid escape '\\{0}' at byte {1}")]
    InvalidEscape(char, usize),
}

/// Splits `input` into argv, honoring quoting. Returns one entry per
/// argument; adjacent quoted/unquoted runs with no intervening
/// whitespace concatenate into a single argument (`a"b c"` is one word
/// containing a space).
pub fn split_argv(input: &str) -> Result<Vec<String>, SplitError> {
    let mut chars = input.char_indices().peekable();
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                chars.next();
                in_word = true;
                lex_single_quote(&mut chars, pos, &mut current)?;
            }
            '"' => {
                chars.next();
                in_word = true;
                lex_double_quote(&mut chars, pos, &mut current)?;
            }
            _ => {
                chars.next();
                in_word = true;
                current.push(ch);
            }
        }
    }

    if in_word {
        args.push(current);
    }

    Ok(args)
}

fn lex_single_quote(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
    out: &mut String,
) -> Result<(), SplitError> {
    for (_, ch) in chars.by_ref() {
        if ch == '\'' {
            return Ok(());
        }
        out.push(ch);
    }
    Err(SplitError::UnterminatedSingleQuote(start))
}

fn lex_double_quote(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
    out: &mut String,
) -> Result<(), SplitError> {
    while let Some((pos, ch)) = chars.next() {
        match ch {
            '"' => return Ok(()),
            '\\' => {
                let Some(&(esc_pos, esc_ch)) = chars.peek() else {
                    return Err(SplitError::TrailingBackslash(pos));
                };
                let replacement = match esc_ch {
                    '\\' => '\\',
                    'n' => '\n',
                    't' => '\t',
                    '"' => '"',
                    '\'' => '\'',
                    '$' => '$',
                    other => return Err(SplitError::InvalidEscape(other, esc_pos)),
                };
                out.push(replacement);
                chars.next();
            }
            _ => out.push(ch),
        }
    }
    Err(SplitError::UnterminatedDoubleQuote(start))
}

/// Quotes `arg` with double quotes if it contains whitespace or a quote
/// character; otherwise returns it unchanged. Used when reconstructing
/// a human-readable command line for logs.
pub fn quote_if_needed(arg: &str) -> String {
    if arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
        let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        arg.to_string()
    }
}

#[cfg(test)]
#[path = "split_tests.rs"]
mod tests;
