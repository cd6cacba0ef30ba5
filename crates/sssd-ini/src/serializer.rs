//! Rendering a [`Document`] back to text.

use crate::document::{Document, Entry, OptionEntry, Section};

/// Render a document to INI text.
///
/// Lines that were parsed and never modified come out exactly as they were
/// read, line ending included. Modified or new options are written as
/// `name = value`, followed by their inline comment if they had one, and
/// end with the document's line ending. The output ends with a line break
/// when it is not empty.
pub fn serialize(doc: &Document) -> String {
    let newline = if doc.uses_crlf() { "\r\n" } else { "\n" };
    let mut out = String::new();
    for entry in doc.preamble() {
        write_entry(&mut out, entry, newline);
    }
    for section in doc.sections() {
        write_section(&mut out, section, newline);
    }
    out
}

fn write_section(out: &mut String, section: &Section, newline: &str) {
    match section.header() {
        Some(header) => {
            out.push_str(header);
            out.push('\n');
        }
        None => {
            out.push('[');
            out.push_str(section.name());
            out.push(']');
            out.push_str(newline);
        }
    }
    for entry in section.entries() {
        write_entry(out, entry, newline);
    }
}

// Stored source text already carries its `\r`, so it only needs the `\n`.
fn write_entry(out: &mut String, entry: &Entry, newline: &str) {
    match entry {
        Entry::Option(opt) => match opt.raw() {
            Some(raw) => {
                out.push_str(raw);
                out.push('\n');
            }
            None => {
                write_option(out, opt);
                out.push_str(newline);
            }
        },
        Entry::Comment(text) | Entry::Blank(text) => {
            out.push_str(text);
            out.push('\n');
        }
    }
}

fn write_option(out: &mut String, opt: &OptionEntry) {
    out.push_str(opt.name());
    out.push_str(" =");
    if !opt.value().is_empty() {
        out.push(' ');
        out.push_str(opt.value());
    }
    if let Some(comment) = opt.comment() {
        out.push(' ');
        out.push_str(comment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_untouched_text_is_byte_identical() {
        let text = "# sssd.conf\n\n[sssd]\nservices=nss,pam   ; core\n  domains : LOCAL\n\n[domain/LOCAL]\n\tenumerate = true\n";
        let doc = parse(text).unwrap();
        assert_eq!(serialize(&doc), text);
    }

    #[test]
    fn test_modified_option_keeps_comment() {
        let mut doc = parse("[sssd]\nservices=nss,pam   ; core\n").unwrap();
        doc.set("sssd", "services", "nss, pam, sudo").unwrap();
        assert_eq!(serialize(&doc), "[sssd]\nservices = nss, pam, sudo ; core\n");
    }

    #[test]
    fn test_empty_value() {
        let mut doc = crate::Document::new();
        doc.set("nss", "filter_users", "").unwrap();
        assert_eq!(serialize(&doc), "[nss]\nfilter_users =\n");
    }

    #[test]
    fn test_crlf_edits_use_crlf() {
        let mut doc = parse("[sssd]\r\nservices = nss\r\n").unwrap();
        doc.set("sssd", "services", "nss, pam").unwrap();
        doc.set("nss", "debug_level", "2").unwrap();
        assert_eq!(
            serialize(&doc),
            "[sssd]\r\nservices = nss, pam\r\n\r\n[nss]\r\ndebug_level = 2\r\n"
        );
    }

    #[test]
    fn test_new_sections_are_separated() {
        let mut doc = crate::Document::new();
        doc.set("sssd", "config_file_version", "2").unwrap();
        doc.set("nss", "reconnection_retries", "3").unwrap();
        insta::assert_snapshot!(serialize(&doc), @r"
        [sssd]
        config_file_version = 2

        [nss]
        reconnection_retries = 3
        ");
    }
}
