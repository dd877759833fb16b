// This file is part of tish, a tiny job-control shell.
// Copyright (C) 2026 tish contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Splitting an input line into words

/// Characters that separate words
const BLANKS: [char; 2] = [' ', '\t'];

/// Words of an input line
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandLine {
    /// Command name followed by its arguments
    ///
    /// This vector is never empty.
    pub words: Vec<String>,
    /// Whether the command line ended with `&`
    pub background: bool,
}

impl CommandLine {
    /// Returns the command name.
    pub fn name(&self) -> &str {
        &self.words[0]
    }
}

/// Splits a line into words.
///
/// Words are separated by spaces and tabs. A word that starts with a single
/// quote extends to the next single quote, or to the end of the line if the
/// quote is not closed; the quotes are not part of the word. The last word is
/// removed and the command line is marked as background if the word starts
/// with `&`.
///
/// Returns `None` if the line contains no words other than the `&`.
///
/// ```
/// # use tish_semantics::command_line::parse;
/// let command_line = parse("echo 'hello world' &").unwrap();
/// assert_eq!(command_line.words, ["echo", "hello world"]);
/// assert!(command_line.background);
/// ```
#[must_use]
pub fn parse(line: &str) -> Option<CommandLine> {
    let mut words = Vec::new();
    let mut rest = line.trim_start_matches(BLANKS);
    while !rest.is_empty() {
        let (word, tail) = match rest.strip_prefix('\'') {
            Some(quoted) => match quoted.find('\'') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            },
            None => match rest.find(BLANKS) {
                Some(end) => rest.split_at(end),
                None => (rest, ""),
            },
        };
        words.push(word.to_owned());
        rest = tail.trim_start_matches(BLANKS);
    }

    let background = words.last().is_some_and(|word| word.starts_with('&'));
    if background {
        words.pop();
    }

    if words.is_empty() {
        None
    } else {
        Some(CommandLine { words, background })
    }
}
