// src/extract/mod.rs

use roxmltree::Document;
use std::{fmt, fs, io, path::PathBuf};
use tracing::warn;

use crate::fetch::{Fetcher, Transport};

pub mod contacts;
pub mod fields;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod xml;

pub use contacts::{extract_contacts, ContactRecord, ContactTable};
pub use fields::{extract_fields, extract_fields_from_str, Contribution, FilingRecord, RawFiling};

/// Where a filing's XML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilingSource {
    Remote(String),
    Local(PathBuf),
}

impl FilingSource {
    pub fn remote(url: impl Into<String>) -> Self {
        FilingSource::Remote(url.into())
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        FilingSource::Local(path.into())
    }
}

impl fmt::Display for FilingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilingSource::Remote(url) => f.write_str(url),
            FilingSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetch or read a filing. Failures are logged and give `None`.
pub(crate) fn load_filing_xml<T: Transport>(
    fetcher: &Fetcher<T>,
    source: &FilingSource,
) -> Option<String> {
    match source {
        FilingSource::Remote(url) => fetcher.fetch(url).map(|page| page.body),
        // same lossy decoding as a fetched body
        FilingSource::Local(path) => match fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "file not found");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read file");
                None
            }
        },
    }
}

/// Parse filing text, tolerating surrounding whitespace and a byte-order mark.
pub(crate) fn parse_filing(text: &str) -> Option<Document<'_>> {
    let text = text.trim().trim_start_matches('\u{feff}').trim_start();
    match Document::parse(text) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!(error = %e, "malformed filing XML");
            None
        }
    }
}
