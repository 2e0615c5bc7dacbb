// src/extract/fields.rs

use roxmltree::Document;
use serde::{ser::SerializeMap, Serialize, Serializer};
use std::ops::Index;
use tracing::debug;

use super::{load_filing_xml, parse_filing, xml, FilingSource};
use crate::fetch::{Fetcher, Transport};

pub const COL_BUSINESS_NAME: &str = "ba";
pub const COL_EIN: &str = "EIN";
pub const COL_TAX_YEAR: &str = "Tax Year";
pub const COL_ZIP_CODE: &str = "Location (Zipcode)";

/// Placeholder for a missing business name.
pub const NOT_FOUND: &str = "Not found";
/// Placeholder for any other missing text field.
pub const MISSING: &str = "0";

/// Contribution amounts reported in Part VIII, line 1 of Form 990.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Contribution {
    FederatedCampaigns,
    MembershipDues,
    FundraisingEvents,
    RelatedOrganizations,
    GovernmentGrants,
    AllOtherContributions,
    NoncashContributions,
    Total,
}

impl Contribution {
    pub const ALL: [Contribution; 8] = [
        Contribution::FederatedCampaigns,
        Contribution::MembershipDues,
        Contribution::FundraisingEvents,
        Contribution::RelatedOrganizations,
        Contribution::GovernmentGrants,
        Contribution::AllOtherContributions,
        Contribution::NoncashContributions,
        Contribution::Total,
    ];

    /// The categories that add up to `Total`. Noncash gifts are already
    /// counted inside "all other contributions".
    pub const CATEGORIES: [Contribution; 6] = [
        Contribution::FederatedCampaigns,
        Contribution::MembershipDues,
        Contribution::FundraisingEvents,
        Contribution::RelatedOrganizations,
        Contribution::GovernmentGrants,
        Contribution::AllOtherContributions,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Contribution::FederatedCampaigns => "Federate Campaigns",
            Contribution::MembershipDues => "Membership Dues",
            Contribution::FundraisingEvents => "Fundraising Events",
            Contribution::RelatedOrganizations => "Related Organizations",
            Contribution::GovernmentGrants => "Government Grants",
            Contribution::AllOtherContributions => "All Other Contributions",
            Contribution::NoncashContributions => "Noncash Contributions",
            Contribution::Total => "Total",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Contribution::FederatedCampaigns => "FederatedCampaignsAmt",
            Contribution::MembershipDues => "MembershipDuesAmt",
            Contribution::FundraisingEvents => "ContriRptFundraisingEventAmt",
            Contribution::RelatedOrganizations => "RelatedOrganizationsAmt",
            Contribution::GovernmentGrants => "GovernmentGrantsAmt",
            Contribution::AllOtherContributions => "AllOtherContributionsAmt",
            Contribution::NoncashContributions => "NoncashContributionsAmt",
            Contribution::Total => "TotalContributionsAmt",
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

/// Every column of a filing row, in table order.
pub fn columns() -> impl Iterator<Item = &'static str> {
    [COL_BUSINESS_NAME, COL_EIN, COL_TAX_YEAR, COL_ZIP_CODE]
        .into_iter()
        .chain(Contribution::ALL.iter().map(|c| c.column()))
}

/// Fields as found in the XML, before any defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawFiling {
    pub business_name: Option<String>,
    pub ein: Option<String>,
    pub tax_period_begin: Option<String>,
    pub zip_code: Option<String>,
    pub amounts: [Option<String>; 8],
}

impl RawFiling {
    pub fn from_document(doc: &Document<'_>) -> Self {
        let root = doc.root_element();
        let zip_code =
            xml::find_first(root, "USAddress").and_then(|addr| xml::find_text(addr, "ZIPCd"));

        RawFiling {
            business_name: xml::find_text(root, "BusinessName"),
            ein: xml::find_text(root, "EIN"),
            tax_period_begin: xml::find_text(root, "TaxPeriodBeginDt"),
            zip_code,
            amounts: Contribution::ALL.map(|c| xml::find_text(root, c.tag())),
        }
    }

    pub fn amount(&self, c: Contribution) -> Option<&str> {
        self.amounts[c.position()].as_deref()
    }

    /// Substitute placeholders for everything that was not found.
    pub fn with_defaults(self) -> FilingRecord {
        let tax_year = self.tax_period_begin.as_deref().and_then(|raw| {
            let year = xml::parse_tax_year(raw);
            if year.is_none() {
                debug!(raw, "unparseable tax period");
            }
            year
        });

        FilingRecord {
            business_name: self
                .business_name
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| NOT_FOUND.to_string()),
            ein: or_missing(self.ein),
            tax_year,
            zip_code: or_missing(self.zip_code),
            amounts: Amounts(self.amounts.map(or_missing)),
        }
    }
}

fn or_missing(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING.to_string())
}

/// The eight contribution amounts, indexed by [`Contribution`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amounts(pub [String; 8]);

impl Index<Contribution> for Amounts {
    type Output = str;

    fn index(&self, c: Contribution) -> &str {
        &self.0[c.position()]
    }
}

/// One row of the filing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingRecord {
    pub business_name: String,
    pub ein: String,
    /// `None` when the tax period is missing or unreadable; distinct from 0.
    pub tax_year: Option<i32>,
    pub zip_code: String,
    pub amounts: Amounts,
}

impl FilingRecord {
    /// True if any field carries a placeholder instead of filing data.
    pub fn has_defaults(&self) -> bool {
        self.business_name == NOT_FOUND
            || self.ein == MISSING
            || self.tax_year.is_none()
            || self.zip_code == MISSING
            || self.amounts.0.iter().any(|a| a == MISSING)
    }
}

impl Serialize for FilingRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4 + Contribution::ALL.len()))?;
        map.serialize_entry(COL_BUSINESS_NAME, &self.business_name)?;
        map.serialize_entry(COL_EIN, &self.ein)?;
        map.serialize_entry(COL_TAX_YEAR, &self.tax_year)?;
        map.serialize_entry(COL_ZIP_CODE, &self.zip_code)?;
        for c in Contribution::ALL {
            map.serialize_entry(c.column(), &self.amounts[c])?;
        }
        map.end()
    }
}

/// Fetch or read one filing and map it to a row. `None` when the XML could
/// not be obtained or parsed.
#[tracing::instrument(level = "debug", skip(fetcher, source), fields(source = %source))]
pub fn extract_fields<T: Transport>(
    fetcher: &Fetcher<T>,
    source: &FilingSource,
) -> Option<FilingRecord> {
    let text = load_filing_xml(fetcher, source)?;
    extract_fields_from_str(&text)
}

pub fn extract_fields_from_str(text: &str) -> Option<FilingRecord> {
    let doc = parse_filing(text)?;
    Some(RawFiling::from_document(&doc).with_defaults())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ScraperConfig,
        extract::fixtures::FULL,
        fetch::scripted::{no_sleep, ScriptedTransport},
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn full_filing_has_no_placeholders() {
        let rec = extract_fields_from_str(FULL).expect("parsed");
        assert!(!rec.has_defaults());
        assert_eq!(rec.business_name, "Acme Charity");
        assert_eq!(rec.ein, "530196605");
        assert_eq!(rec.tax_year, Some(2020));
        assert_eq!(rec.zip_code, "20001");
        assert_eq!(&rec.amounts[Contribution::FundraisingEvents], "30");
        assert_eq!(&rec.amounts[Contribution::Total], "210");
    }

    #[test]
    fn serializes_with_column_names() {
        let rec = extract_fields_from_str(FULL).unwrap();
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["ba"], "Acme Charity");
        assert_eq!(v["Tax Year"], 2020);
        assert_eq!(v["Federate Campaigns"], "10");
        assert_eq!(v["Total"], "210");
        assert_eq!(v.as_object().unwrap().len(), columns().count());
    }

    #[test]
    fn missing_elements_get_placeholders() {
        let rec = extract_fields_from_str("<Return><EIN>12</EIN></Return>").unwrap();
        assert_eq!(rec.business_name, NOT_FOUND);
        assert_eq!(rec.ein, "12");
        assert_eq!(rec.tax_year, None);
        assert_eq!(rec.zip_code, "0");
        assert!(rec.amounts.0.iter().all(|a| a == "0"));
    }

    #[test]
    fn address_without_zip_defaults() {
        let xml = "<Return><USAddress><CityNm>X</CityNm></USAddress><ZIPCd>99999</ZIPCd></Return>";
        let rec = extract_fields_from_str(xml).unwrap();
        // a ZIPCd outside the address block does not count
        assert_eq!(rec.zip_code, "0");
    }

    #[test]
    fn raw_stage_keeps_absence() {
        let xml = "<Return><TotalContributionsAmt>7</TotalContributionsAmt></Return>";
        let doc = Document::parse(xml).unwrap();
        let raw = RawFiling::from_document(&doc);
        assert_eq!(raw.amount(Contribution::Total), Some("7"));
        assert_eq!(raw.amount(Contribution::MembershipDues), None);
        assert_eq!(raw.business_name, None);
    }

    #[test]
    fn extraction_is_idempotent() {
        assert_eq!(extract_fields_from_str(FULL), extract_fields_from_str(FULL));
    }

    #[test]
    fn malformed_xml_gives_none() {
        assert!(extract_fields_from_str("<Return><EIN>1</Return>").is_none());
    }

    #[test]
    fn latin1_byte_in_local_file_matches_remote() {
        // "1 Café St" with the é as a single Latin-1 byte
        let (head, tail) = FULL.split_once("Main").unwrap();
        let mut bytes = head.as_bytes().to_vec();
        bytes.extend_from_slice(b"Caf\xE9");
        bytes.extend_from_slice(tail.as_bytes());
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(&bytes).unwrap();

        let lossy = String::from_utf8_lossy(&bytes).into_owned();
        let transport = ScriptedTransport::new().respond("http://x/cafe.xml", 200, &lossy);
        let fetcher = Fetcher::new(transport, &ScraperConfig::default()).with_sleeper(no_sleep);

        let local = extract_fields(&fetcher, &FilingSource::local(f.path())).unwrap();
        let remote = extract_fields(&fetcher, &FilingSource::remote("http://x/cafe.xml")).unwrap();
        assert_eq!(local.ein, "530196605");
        assert_eq!(local, remote);
    }

    #[test]
    fn local_file_and_missing_file() {
        let fetcher = Fetcher::new(ScriptedTransport::new(), &ScraperConfig::default())
            .with_sleeper(no_sleep);

        let mut f = NamedTempFile::new().unwrap();
        write!(f, "\u{feff}\n{}\n", FULL).unwrap();
        let rec = extract_fields(&fetcher, &FilingSource::local(f.path())).unwrap();
        assert_eq!(rec.ein, "530196605");

        let gone = FilingSource::local("/definitely/not/here.xml");
        assert!(extract_fields(&fetcher, &gone).is_none());
        assert_eq!(fetcher.transport().total_calls(), 0);
    }

    #[test]
    fn remote_fetch_failure_gives_none() {
        let transport = ScriptedTransport::new()
            .respond("http://x/ok.xml", 200, FULL)
            .respond("http://x/bad.xml", 500, "");
        let fetcher = Fetcher::new(transport, &ScraperConfig::default()).with_sleeper(no_sleep);

        assert!(extract_fields(&fetcher, &FilingSource::remote("http://x/ok.xml")).is_some());
        assert!(extract_fields(&fetcher, &FilingSource::remote("http://x/bad.xml")).is_none());
    }
}
