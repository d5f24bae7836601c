//! Tokens, spans and token streams shared by the hare lexer and parser

use crate::spanned::{LineReader, Span};
use std::fmt::{Display, Formatter};

pub mod spanned;
pub mod token;

/// An error with a location
#[derive(Debug, thiserror::Error)]
pub struct SpannedError<E, C> {
    error: E,
    location: Option<Span>,
    cause: Option<Box<C>>,
}

impl<E, C> SpannedError<E, C> {
    pub fn new(error: E, location: impl Into<Option<Span>>, cause: impl Into<Option<C>>) -> Self {
        Self {
            error,
            location: location.into(),
            cause: cause.into().map(Box::new),
        }
    }

    /// The error itself
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Where this error occurred, if known
    pub fn location(&self) -> Option<Span> {
        self.location
    }

    pub fn cause(&self) -> Option<&C> {
        self.cause.as_deref()
    }

    /// Pairs this error with the source it was produced from, so it can be rendered with
    /// the offending lines
    pub fn with_source<'a>(&'a self, name: &'a str, src: &'a str) -> SourceSnippet<'a, E, C> {
        SourceSnippet {
            error: self,
            name,
            src,
        }
    }
}

impl<E: Display, C: Display> Display for SpannedError<E, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(location) = &self.location {
            write!(f, " (at byte {})", location.offset())?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

/// A [SpannedError] rendered against its source text
pub struct SourceSnippet<'a, E, C> {
    error: &'a SpannedError<E, C>,
    name: &'a str,
    src: &'a str,
}

impl<E: Display, C: Display> Display for SourceSnippet<'_, E, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.error.error)?;
        if let Some(location) = &self.error.location {
            write!(f, "  -> {}", self.name)?;
            let (lines, base_line) = LineReader::new(2, 2)
                .lines(self.src, location)
                .ok_or(std::fmt::Error)?;
            let col = lines
                .iter()
                .find(|line| line.line == base_line)
                .map(|line| line.col)
                .unwrap_or_default();
            writeln!(f, ":{base_line}:{}", col + 1)?;
            let width = lines.iter().map(|line| line.line).max().unwrap_or(0) / 10 + 1;
            for line in &lines {
                writeln!(f, "{:width$} | {}", line.line, line.src.trim_end())?;
                if line.line == base_line {
                    let col = line.col;
                    if location.len() > 0 {
                        writeln!(
                            f,
                            "{}{}{}",
                            " ".repeat(width + 3),
                            " ".repeat(col),
                            "~".repeat(location.len())
                        )?;
                    } else {
                        writeln!(f, "{}{}^", " ".repeat(width + 3), "-".repeat(col))?;
                    }
                }
            }
        }
        if let Some(cause) = &self.error.cause {
            writeln!(f, "caused by: {cause}")?;
        }

        Ok(())
    }
}
