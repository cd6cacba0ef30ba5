//! The order-preserving document model.

use crate::ValueError;
use crate::parser::check_value;
use indexmap::IndexMap;

/// One `name = value` line.
///
/// `raw` caches the line exactly as it was read. It is cleared as soon as the
/// value changes, after which the serializer renders the entry from its parts.
/// Equality ignores the cache, so a reparsed document compares equal to the
/// one it was written from.
#[derive(Debug, Clone, Eq)]
pub struct OptionEntry {
    name: String,
    value: String,
    comment: Option<String>,
    raw: Option<String>,
}

impl PartialEq for OptionEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value && self.comment == other.comment
    }
}

impl OptionEntry {
    /// Create an entry that has no source text yet.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            comment: None,
            raw: None,
        }
    }

    pub(crate) fn from_source(
        name: String,
        value: String,
        comment: Option<String>,
        raw: String,
    ) -> Self {
        Self {
            name,
            value,
            comment,
            raw: Some(raw),
        }
    }

    /// Attach an inline comment (including its `#` or `;` marker).
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self.raw = None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The inline comment following the value, if any.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// The original line, when the entry is unmodified since parsing.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Replace the value. Returns `false` (and keeps the original text) when
    /// the new value is identical to the current one.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value == self.value {
            return false;
        }
        self.value = value;
        self.raw = None;
        true
    }
}

/// A single line inside a section (or before the first section).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// `name = value`, optionally followed by an inline comment
    Option(OptionEntry),

    /// A full-line comment, stored exactly as written
    Comment(String),

    /// A whitespace-only line, stored exactly as written (usually empty)
    Blank(String),
}

impl Entry {
    /// An empty line.
    pub fn blank() -> Self {
        Entry::Blank(String::new())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Entry::Blank(_))
    }

    pub fn as_option(&self) -> Option<&OptionEntry> {
        match self {
            Entry::Option(opt) => Some(opt),
            _ => None,
        }
    }

    fn as_option_mut(&mut self) -> Option<&mut OptionEntry> {
        match self {
            Entry::Option(opt) => Some(opt),
            _ => None,
        }
    }
}

/// A bracketed section and its ordered entries.
#[derive(Debug, Clone, Eq)]
pub struct Section {
    name: String,
    header: Option<String>,
    entries: Vec<Entry>,
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.entries == other.entries
    }
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: None,
            entries: Vec::new(),
        }
    }

    pub(crate) fn from_source(name: String, header: String) -> Self {
        Self {
            name,
            header: Some(header),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The header line as originally written, if the section was parsed.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Every entry in order, comments and blank lines included.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Option entries in order.
    pub fn options(&self) -> impl Iterator<Item = &OptionEntry> {
        self.entries.iter().filter_map(Entry::as_option)
    }

    /// Option names in order.
    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options().map(OptionEntry::name)
    }

    pub fn option(&self, name: &str) -> Option<&OptionEntry> {
        self.options().find(|opt| opt.name == name)
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.option(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.option(name).map(OptionEntry::value)
    }

    /// Set an option value.
    ///
    /// An existing entry is updated in place and keeps its inline comment.
    /// A new entry goes right after the last non-blank line, so blank lines
    /// separating this section from the next one stay at the end.
    ///
    /// Returns `true` if the section changed. Values that would not read
    /// back unchanged (see [`check_value`]) are refused and leave the
    /// section untouched.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<bool, ValueError> {
        let value = value.into();
        check_value(&value)?;
        if let Some(opt) = self
            .entries
            .iter_mut()
            .filter_map(Entry::as_option_mut)
            .find(|opt| opt.name == name)
        {
            return Ok(opt.set_value(value));
        }

        let position = self
            .entries
            .iter()
            .rposition(|entry| !entry.is_blank())
            .map_or(0, |idx| idx + 1);
        self.entries
            .insert(position, Entry::Option(OptionEntry::new(name, value)));
        Ok(true)
    }

    /// Remove an option. Returns `false` if it was not present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| entry.as_option().is_none_or(|opt| opt.name != name));
        before != self.entries.len()
    }

    fn ends_with_blank(&self) -> bool {
        self.entries.last().is_some_and(Entry::is_blank)
    }
}

/// A parsed configuration text: leading comments, then ordered sections.
///
/// Parsed lines keep a trailing `\r` in their stored text. Lines created
/// later are terminated the way the document's first line was.
#[derive(Debug, Clone, Default, Eq)]
pub struct Document {
    preamble: Vec<Entry>,
    sections: IndexMap<String, Section>,
    crlf: bool,
}

// IndexMap equality ignores order; section order is significant here.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.preamble == other.preamble && self.sections.values().eq(other.sections.values())
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether new lines are terminated with `\r\n`.
    pub fn uses_crlf(&self) -> bool {
        self.crlf
    }

    pub(crate) fn set_crlf(&mut self, crlf: bool) {
        self.crlf = crlf;
    }

    /// Comments and blank lines that precede the first section header.
    pub fn preamble(&self) -> &[Entry] {
        &self.preamble
    }

    pub(crate) fn push_preamble(&mut self, entry: Entry) {
        self.preamble.push(entry);
    }

    pub(crate) fn push_section(&mut self, section: Section) {
        self.sections.insert(section.name.clone(), section);
    }

    pub(crate) fn last_section_mut(&mut self) -> Option<&mut Section> {
        self.sections.last_mut().map(|(_, section)| section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.get_mut(name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.section(section)
            .is_some_and(|section| section.has_option(option))
    }

    /// All entries of a section, comments and blanks included.
    pub fn options(&self, section: &str) -> Option<&[Entry]> {
        self.section(section).map(Section::entries)
    }

    /// The raw text value of an option.
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.section(section).and_then(|section| section.get(option))
    }

    /// Return the named section, appending an empty one if it is missing.
    ///
    /// A blank line is added after the previous last section so the new
    /// header does not run into its entries.
    pub fn add_section(&mut self, name: &str) -> &mut Section {
        if !self.sections.contains_key(name) {
            let blank = if self.crlf {
                Entry::Blank("\r".to_string())
            } else {
                Entry::blank()
            };
            if let Some(last) = self.last_section_mut()
                && !last.entries.is_empty()
                && !last.ends_with_blank()
            {
                last.push(blank);
            }
            self.push_section(Section::new(name));
        }
        self.sections
            .entry(name.to_string())
            .or_insert_with(|| Section::new(name))
    }

    /// Remove a section, keeping the order of the remaining ones.
    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        self.sections.shift_remove(name)
    }

    /// Set an option, creating the section when needed.
    ///
    /// A refused value creates nothing.
    pub fn set(
        &mut self,
        section: &str,
        option: &str,
        value: impl Into<String>,
    ) -> Result<bool, ValueError> {
        let value = value.into();
        check_value(&value)?;
        self.add_section(section).set(option, value)
    }

    /// Remove an option. Returns `false` if the section or option is absent.
    pub fn remove_option(&mut self, section: &str, option: &str) -> bool {
        self.section_mut(section)
            .is_some_and(|section| section.remove(option))
    }
}
