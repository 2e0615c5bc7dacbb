// src/extract/contacts.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Int32Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::{fields::NOT_FOUND, parse_filing, xml, FilingSource};
use crate::fetch::{Fetcher, Transport};

/// Part VII, Section A: one block per officer, director, trustee or key employee.
const PERSON_BLOCK: &str = "Form990PartVIISectionAGrp";

/// One person listed on a filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    pub organization: String,
    pub year: i32,
    #[serde(rename = "names")]
    pub name: String,
    #[serde(rename = "titles")]
    pub title: Option<String>,
}

/// People found across one or more filings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactTable {
    pub rows: Vec<ContactRecord>,
}

impl ContactTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn append(&mut self, other: ContactTable) {
        self.rows.extend(other.rows);
    }

    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new("organization", DataType::Utf8, false),
            Field::new("year", DataType::Int32, false),
            Field::new("names", DataType::Utf8, false),
            Field::new("titles", DataType::Utf8, true),
        ])
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let organization: StringArray =
            self.rows.iter().map(|r| Some(r.organization.as_str())).collect();
        let year: Int32Array = self.rows.iter().map(|r| Some(r.year)).collect();
        let names: StringArray = self.rows.iter().map(|r| Some(r.name.as_str())).collect();
        let titles: StringArray = self.rows.iter().map(|r| r.title.as_deref()).collect();

        let cols: Vec<ArrayRef> = vec![
            Arc::new(organization),
            Arc::new(year),
            Arc::new(names),
            Arc::new(titles),
        ];
        RecordBatch::try_new(Arc::new(Self::schema()), cols).context("building contacts batch")
    }
}

/// People listed on one filing. `None` when the document cannot be obtained.
///
/// A `Local` source is requested over HTTP with its path as the URL rather
/// than read from disk, so local contacts only work for paths a server will
/// answer. Any answer counts: a body that is not a filing gives an empty
/// table.
#[tracing::instrument(level = "debug", skip(fetcher, source), fields(source = %source))]
pub fn extract_contacts<T: Transport>(
    fetcher: &Fetcher<T>,
    source: &FilingSource,
) -> Option<ContactTable> {
    match source {
        FilingSource::Remote(url) => contacts_from_str(&fetcher.fetch(url)?.body),
        FilingSource::Local(path) => {
            let page = fetcher.fetch_once(&path.to_string_lossy())?;
            Some(contacts_from_str(&page.body).unwrap_or_default())
        }
    }
}

/// Names and titles are gathered independently and paired by position, so a
/// block missing one of them shifts the pairing of every later row.
pub fn contacts_from_str(text: &str) -> Option<ContactTable> {
    let doc = parse_filing(text)?;
    let root = doc.root_element();

    let blocks: Vec<_> = xml::find_all(root, PERSON_BLOCK).collect();
    let names: Vec<String> = blocks
        .iter()
        .filter_map(|b| xml::find_text(*b, "PersonNm"))
        .collect();
    let mut titles = blocks
        .iter()
        .filter_map(|b| xml::find_text(*b, "TitleTxt"));

    let organization = xml::find_text(root, "BusinessName")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| NOT_FOUND.to_string());
    let year = xml::find_text(root, "TaxPeriodBeginDt")
        .and_then(|raw| xml::parse_tax_year(&raw))
        .unwrap_or(0);

    debug!(blocks = blocks.len(), names = names.len(), "contacts");
    let rows = names
        .into_iter()
        .map(|name| ContactRecord {
            organization: organization.clone(),
            year,
            name,
            title: titles.next(),
        })
        .collect();
    Some(ContactTable { rows })
}
