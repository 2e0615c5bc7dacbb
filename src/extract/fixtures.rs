// src/extract/fixtures.rs
//
// Sample e-file documents for tests.

pub const FULL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Return xmlns="http://www.irs.gov/efile" returnVersion="2019v5.1">
  <ReturnHeader>
    <TaxPeriodBeginDt>2020-01-01</TaxPeriodBeginDt>
    <Filer>
      <EIN>530196605</EIN>
      <BusinessName>
        <BusinessNameLine1Txt>  Acme Charity  </BusinessNameLine1Txt>
      </BusinessName>
      <USAddress>
        <AddressLine1Txt>1 Main St</AddressLine1Txt>
        <ZIPCd>20001</ZIPCd>
      </USAddress>
    </Filer>
  </ReturnHeader>
  <ReturnData>
    <IRS990>
      <FederatedCampaignsAmt>10</FederatedCampaignsAmt>
      <MembershipDuesAmt>20</MembershipDuesAmt>
      <ContriRptFundraisingEventAmt>30</ContriRptFundraisingEventAmt>
      <RelatedOrganizationsAmt>40</RelatedOrganizationsAmt>
      <GovernmentGrantsAmt>50</GovernmentGrantsAmt>
      <AllOtherContributionsAmt>60</AllOtherContributionsAmt>
      <NoncashContributionsAmt>5</NoncashContributionsAmt>
      <TotalContributionsAmt>210</TotalContributionsAmt>
      <Form990PartVIISectionAGrp>
        <PersonNm>Jane Roe</PersonNm>
        <TitleTxt>President</TitleTxt>
      </Form990PartVIISectionAGrp>
      <Form990PartVIISectionAGrp>
        <PersonNm>John Doe</PersonNm>
        <TitleTxt>Treasurer</TitleTxt>
      </Form990PartVIISectionAGrp>
    </IRS990>
  </ReturnData>
</Return>"#;

/// A minimal filing with the given header and the six category amounts;
/// `total` is written as-is so mismatches can be staged.
pub fn filing(name: &str, ein: &str, begin: &str, categories: [i64; 6], total: i64) -> String {
    let [fed, dues, events, related, grants, other] = categories;
    format!(
        r#"<Return xmlns="http://www.irs.gov/efile">
  <ReturnHeader>
    <TaxPeriodBeginDt>{begin}</TaxPeriodBeginDt>
    <Filer>
      <EIN>{ein}</EIN>
      <BusinessName><BusinessNameLine1Txt>{name}</BusinessNameLine1Txt></BusinessName>
      <USAddress><ZIPCd>55401</ZIPCd></USAddress>
    </Filer>
  </ReturnHeader>
  <ReturnData><IRS990>
    <FederatedCampaignsAmt>{fed}</FederatedCampaignsAmt>
    <MembershipDuesAmt>{dues}</MembershipDuesAmt>
    <ContriRptFundraisingEventAmt>{events}</ContriRptFundraisingEventAmt>
    <RelatedOrganizationsAmt>{related}</RelatedOrganizationsAmt>
    <GovernmentGrantsAmt>{grants}</GovernmentGrantsAmt>
    <AllOtherContributionsAmt>{other}</AllOtherContributionsAmt>
    <NoncashContributionsAmt>0</NoncashContributionsAmt>
    <TotalContributionsAmt>{total}</TotalContributionsAmt>
  </IRS990></ReturnData>
</Return>"#
    )
}

/// An index page linking each path as a plain 990 XML download.
pub fn index_page(paths: &[&str]) -> String {
    let links: String = paths
        .iter()
        .map(|p| format!(r#"<a class="action xml" href="{p}">990</a>"#))
        .collect();
    format!("<html><body>{links}</body></html>")
}
