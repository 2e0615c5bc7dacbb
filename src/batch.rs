// src/batch.rs

use anyhow::Result;
use tracing::{info, instrument};

use crate::{
    config::ScraperConfig,
    extract::{extract_contacts, extract_fields, ContactTable, FilingSource},
    fetch::{filings::locate_filings, Fetcher, Transport},
    table::FilingTable,
    OrgIds,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Log every filing URL as it is processed.
    pub verbose: bool,
    /// Return [`FilingTable::clean`] instead of the raw table.
    pub clean: bool,
}

/// Locate and extract every 990 filing of every organization, in input
/// order, into one table.
///
/// Filings that cannot be fetched or parsed still take a row (all nulls) in
/// the raw table; cleaning removes them.
#[instrument(level = "info", skip_all, fields(orgs = tracing::field::Empty))]
pub fn run_batch<T: Transport>(
    fetcher: &Fetcher<T>,
    config: &ScraperConfig,
    org_ids: impl Into<OrgIds>,
    options: BatchOptions,
) -> Result<FilingTable> {
    let org_ids = org_ids.into();
    let total = org_ids.len();
    tracing::Span::current().record("orgs", total);

    let mut rows = Vec::new();
    let mut overall = 0usize;
    for (index, org_id) in org_ids.iter().enumerate() {
        info!("{} / {}", index, total);
        for url in locate_filings(fetcher, config, org_id) {
            if options.verbose {
                info!("{} {}", overall, url);
            }
            rows.push(extract_fields(fetcher, &FilingSource::Remote(url)));
            overall += 1;
        }
    }
    info!("{} / {}", total, total);

    let table = FilingTable::from_records(&rows)?;
    if options.clean {
        table.clean()
    } else {
        Ok(table)
    }
}

/// People listed on every 990 filing of every organization. Kept apart from
/// [`run_batch`]; filings that cannot be fetched contribute nothing.
#[instrument(level = "info", skip_all)]
pub fn collect_contacts<T: Transport>(
    fetcher: &Fetcher<T>,
    config: &ScraperConfig,
    org_ids: impl Into<OrgIds>,
) -> ContactTable {
    let org_ids = org_ids.into();
    let mut contacts = ContactTable::default();
    for org_id in &org_ids {
        for url in locate_filings(fetcher, config, org_id) {
            if let Some(found) = extract_contacts(fetcher, &FilingSource::Remote(url)) {
                contacts.append(found);
            }
        }
    }
    info!(rows = contacts.len(), "collected contacts");
    contacts
}
