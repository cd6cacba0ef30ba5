//! Line-oriented parser that builds a [`Document`].

use crate::document::{Document, Entry, OptionEntry, Section};
use crate::{Error, Result, ValueError};

/// Parse INI text into a [`Document`].
///
/// # Example
///
/// ```rust
/// use sssd_ini::parse;
///
/// let doc = parse("[nss]\nfilter_users = root\n").unwrap();
/// assert!(doc.has_option("nss", "filter_users"));
/// ```
///
/// # Errors
///
/// Returns an error pointing at the first line that is not a section header,
/// an assignment, a comment or blank, or that repeats a section or option.
pub fn parse(content: &str) -> Result<Document> {
    parse_impl(content)
}

fn parse_impl(content: &str) -> Result<Document> {
    let mut builder = DocumentBuilder::default();
    builder
        .doc
        .set_crlf(content.find('\n').is_some_and(|end| content[..end].ends_with('\r')));

    // Only the `\n` is stripped; a `\r` stays in the stored line text.
    for (idx, line) in content.split_inclusive('\n').enumerate() {
        builder.feed(idx + 1, line.strip_suffix('\n').unwrap_or(line))?;
    }
    Ok(builder.doc)
}

/// Check that `value` reads back unchanged once written as `name = value`.
///
/// ```rust
/// use sssd_ini::{ValueError, check_value};
///
/// assert_eq!(check_value("%1$s@%2$s"), Ok(()));
/// assert_eq!(check_value("%1$s ;%2$s"), Err(ValueError::CommentMarker));
/// ```
pub fn check_value(value: &str) -> std::result::Result<(), ValueError> {
    if value.contains(['\n', '\r']) {
        return Err(ValueError::LineBreak);
    }
    if split_inline_comment(value).1.is_some() {
        return Err(ValueError::CommentMarker);
    }
    Ok(())
}

/// Accumulates entries into the most recently opened section.
#[derive(Default)]
struct DocumentBuilder {
    doc: Document,
}

impl DocumentBuilder {
    fn feed(&mut self, line_no: usize, line: &str) -> Result<()> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            self.push(Entry::Blank(line.to_string()));
            return Ok(());
        }

        if is_comment_marker(trimmed) {
            self.push(Entry::Comment(line.to_string()));
            return Ok(());
        }

        if trimmed.starts_with('[') {
            let name = parse_header(line_no, trimmed)?;
            if self.doc.has_section(&name) {
                return Err(Error::DuplicateSection {
                    line: line_no,
                    name,
                });
            }
            self.doc.push_section(Section::from_source(name, line.to_string()));
            return Ok(());
        }

        let entry = parse_assignment(line_no, line, trimmed)?;
        let Some(section) = self.doc.last_section_mut() else {
            return Err(Error::MissingSectionHeader {
                line: line_no,
                name: entry.name().to_string(),
            });
        };
        if section.has_option(entry.name()) {
            return Err(Error::DuplicateOption {
                line: line_no,
                section: section.name().to_string(),
                option: entry.name().to_string(),
            });
        }
        section.push(Entry::Option(entry));
        Ok(())
    }

    fn push(&mut self, entry: Entry) {
        match self.doc.last_section_mut() {
            Some(section) => section.push(entry),
            None => self.doc.push_preamble(entry),
        }
    }
}

fn is_comment_marker(text: &str) -> bool {
    text.starts_with('#') || text.starts_with(';')
}

/// Parse `[name]`, allowing a trailing full comment after the bracket.
fn parse_header(line_no: usize, trimmed: &str) -> Result<String> {
    let inner = &trimmed[1..];
    let Some(close) = inner.find(']') else {
        return Err(Error::UnterminatedSection { line: line_no });
    };

    let rest = inner[close + 1..].trim();
    if !rest.is_empty() && !is_comment_marker(rest) {
        return Err(Error::UnterminatedSection { line: line_no });
    }

    let name = inner[..close].trim();
    if name.is_empty() {
        return Err(Error::EmptySectionName { line: line_no });
    }
    Ok(name.to_string())
}

/// Split `name = value  # comment` on the first `=` or `:`.
fn parse_assignment(line_no: usize, line: &str, trimmed: &str) -> Result<OptionEntry> {
    let Some(sep) = trimmed.find(['=', ':']) else {
        return Err(Error::Parse {
            line: line_no,
            message: format!("expected `name = value`, found '{trimmed}'"),
        });
    };

    let name = trimmed[..sep].trim();
    if name.is_empty() {
        return Err(Error::Parse {
            line: line_no,
            message: "option name is empty".to_string(),
        });
    }

    let (value, comment) = split_inline_comment(&trimmed[sep + 1..]);
    Ok(OptionEntry::from_source(
        name.to_string(),
        value.trim().to_string(),
        comment.map(str::to_string),
        line.to_string(),
    ))
}

/// An inline comment starts at a `#` or `;` preceded by whitespace.
fn split_inline_comment(text: &str) -> (&str, Option<&str>) {
    let mut prev_is_space = true;
    for (idx, ch) in text.char_indices() {
        if (ch == '#' || ch == ';') && prev_is_space {
            return (&text[..idx], Some(text[idx..].trim_end()));
        }
        prev_is_space = ch.is_whitespace();
    }
    (text, None)
}
