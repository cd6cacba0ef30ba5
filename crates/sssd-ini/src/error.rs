//! Error types for INI parsing with line locations.

use thiserror::Error;

/// Result type alias for sssd-ini operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing an INI document.
///
/// Every variant carries the 1-based line number of the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A `[` without a matching `]`, or trailing text after the header
    #[error("line {line}: unterminated section header")]
    UnterminatedSection { line: usize },

    /// `[]` or a header containing only whitespace
    #[error("line {line}: empty section name")]
    EmptySectionName { line: usize },

    /// An option assignment before the first section header
    #[error("line {line}: option '{name}' appears before any section header")]
    MissingSectionHeader { line: usize, name: String },

    /// The same section header appears twice
    #[error("line {line}: section [{name}] is already defined")]
    DuplicateSection { line: usize, name: String },

    /// The same option appears twice within one section
    #[error("line {line}: option '{option}' is already defined in section [{section}]")]
    DuplicateOption {
        line: usize,
        section: String,
        option: String,
    },

    /// A line that is neither a header, an assignment, a comment nor blank
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Why a value cannot be stored as option text.
///
/// The document reader would split such a value differently, so writing it
/// would change the file's meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("value contains a line break")]
    LineBreak,

    #[error("value would be read back as an inline comment")]
    CommentMarker,
}

impl Error {
    /// The 1-based line number the error points at.
    pub fn line(&self) -> usize {
        match self {
            Error::UnterminatedSection { line }
            | Error::EmptySectionName { line }
            | Error::MissingSectionHeader { line, .. }
            | Error::DuplicateSection { line, .. }
            | Error::DuplicateOption { line, .. }
            | Error::Parse { line, .. } => *line,
        }
    }

    /// Short label used when pointing at the offending line.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Error::UnterminatedSection { .. } => "header is not closed with `]`",
            Error::EmptySectionName { .. } => "section name is empty",
            Error::MissingSectionHeader { .. } => "no section header above this line",
            Error::DuplicateSection { .. } => "section defined again here",
            Error::DuplicateOption { .. } => "option defined again here",
            Error::Parse { .. } => "expected `name = value`, a comment or a section header",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_accessor() {
        let err = Error::DuplicateOption {
            line: 7,
            section: "nss".into(),
            option: "debug_level".into(),
        };
        assert_eq!(err.line(), 7);
        assert_eq!(
            err.to_string(),
            "line 7: option 'debug_level' is already defined in section [nss]"
        );
    }
}
