// src/fetch/filings.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::{Fetcher, Transport};
use crate::{config::ScraperConfig, OrgId};

static ACTION_XML: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".action.xml").expect("selector should parse"));
static DATA_HREF_OPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("option[data-href]").expect("selector should parse"));
/// "990" not followed by a word character or a hyphen: excludes 990-T, 990EZ, 990PF.
static FORM_990: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"990(?:$|[^\w-])").expect("valid regex"));

/// Fetch an organization's index page and list its 990 XML filings.
/// Returns an empty list if the page cannot be fetched.
#[tracing::instrument(level = "debug", skip(fetcher, config))]
pub fn locate_filings<T: Transport>(
    fetcher: &Fetcher<T>,
    config: &ScraperConfig,
    org_id: &OrgId,
) -> Vec<String> {
    let index_url = config.organization_url(org_id);
    let Some(page) = fetcher.fetch(&index_url) else {
        return Vec::new();
    };
    let urls = parse_filing_links(&page.body, &config.site_url);
    info!(org = %org_id, count = urls.len(), "located filings");
    urls
}

/// Extract absolute 990 XML URLs from an index page, in document order.
///
/// Filing links appear either as `<a class="action xml" href=...>` or, when a
/// year has several versions, as `<select class="action xml">` whose options
/// carry `data-href`.
pub fn parse_filing_links(html: &str, site_url: &str) -> Vec<String> {
    let base = match Url::parse(site_url) {
        Ok(u) => u,
        Err(e) => {
            warn!(site_url, error = %e, "invalid site URL");
            return Vec::new();
        }
    };
    let doc = Html::parse_document(html);

    doc.select(&ACTION_XML)
        .filter(|el| FORM_990.is_match(&visible_text(el)))
        .filter_map(|el| {
            let path = filing_path(&el);
            if path.is_none() {
                warn!(tag = el.value().name(), "990 entry without a link");
            }
            path
        })
        .filter_map(|path| match base.join(path) {
            Ok(u) => Some(u.to_string()),
            Err(e) => {
                warn!(path, error = %e, "unresolvable filing link");
                None
            }
        })
        .inspect(|u| debug!(url = %u, "filing"))
        .collect()
}

fn visible_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

fn filing_path<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    if el.value().name() == "a" {
        el.value().attr("href")
    } else {
        el.select(&DATA_HREF_OPTION)
            .next()
            .and_then(|opt| opt.value().attr("data-href"))
    }
}
