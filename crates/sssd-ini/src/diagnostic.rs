//! Visual rendering of parse errors.

use crate::Error;
use std::ops::Range;

impl Error {
    /// Render the error as an ariadne report pointing at the offending line.
    ///
    /// `source` must be the text that was handed to [`crate::parse`].
    /// Colors are disabled so the output can be logged or compared verbatim.
    /// Falls back to the plain message if the report cannot be written.
    pub fn render(&self, source: &str, filename: &str) -> String {
        use ariadne::{Config, Label, Report, ReportKind, Source};

        let span = line_span(source, self.line());
        let report = Report::build(ReportKind::Error, filename.to_string(), span.start)
            .with_config(Config::default().with_color(false))
            .with_message(self.to_string())
            .with_label(Label::new((filename.to_string(), span)).with_message(self.label()))
            .finish();

        let mut output = Vec::new();
        if report
            .write((filename.to_string(), Source::from(source)), &mut output)
            .is_err()
        {
            return format!("{filename}: {self}");
        }
        String::from_utf8(output).unwrap_or_else(|_| format!("{filename}: {self}"))
    }
}

/// Byte range of a 1-based line, without its terminator.
fn line_span(source: &str, line: usize) -> Range<usize> {
    let mut offset = 0;
    for (idx, text) in source.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            let content = text.trim_end_matches(['\n', '\r']);
            return offset..offset + content.len();
        }
        offset += text.len();
    }
    source.len()..source.len()
}
