//! # sssd-ini
//!
//! Order-preserving INI parsing for SSSD configuration files.
//!
//! This crate provides [`Document`], an editable model of an INI text that
//! keeps every comment, blank line and option in its original position. An
//! option line that is never modified is written back byte-for-byte, so a
//! parse/serialize cycle over an untouched file reproduces it exactly.
//!
//! The document model knows nothing about which sections or options are
//! legal. Schema checks live in `sssd-schema` and the editing façade in
//! `sssd-config`.
//!
//! ## Example
//!
//! ```rust
//! use sssd_ini::{parse, serialize};
//!
//! let text = "[sssd]\n# managed services\nservices = nss, pam\n";
//! let mut doc = parse(text).unwrap();
//! assert_eq!(doc.get("sssd", "services"), Some("nss, pam"));
//!
//! doc.set("sssd", "services", "nss, pam, sudo").unwrap();
//! assert_eq!(
//!     serialize(&doc),
//!     "[sssd]\n# managed services\nservices = nss, pam, sudo\n"
//! );
//! ```

mod diagnostic;
mod document;
mod error;
mod parser;
mod serializer;

pub use document::{Document, Entry, OptionEntry, Section};
pub use error::{Error, Result, ValueError};
pub use parser::{check_value, parse};
pub use serializer::serialize;
