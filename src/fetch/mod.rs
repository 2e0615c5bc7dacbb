// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::{thread, time::Duration};
use tracing::{debug, error, info, warn};

use crate::config::ScraperConfig;

pub mod filings;
#[cfg(test)]
pub(crate) mod scripted;

/// Status and UTF-8 body of one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// A single blocking GET. `Err` means no response at all (connect, timeout).
pub trait Transport {
    fn get_page(&self, url: &str) -> Result<Page>;
}

impl Transport for Client {
    fn get_page(&self, url: &str) -> Result<Page> {
        let resp = self
            .get(url)
            .send()
            .with_context(|| format!("GET {} failed", url))?;
        let status = resp.status().as_u16();
        // The site does not always declare a charset; filings are UTF-8.
        let bytes = resp
            .bytes()
            .with_context(|| format!("reading body from {}", url))?;
        Ok(Page {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Build the blocking client used for every request.
pub fn build_client(config: &ScraperConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .context("building HTTP client")
}

/// Paced GET with a bounded number of retries.
///
/// Every attempt is followed by `delay`, whatever its outcome; a retry waits
/// one more `delay` on top. After `max_retries` failed retries the URL is
/// given up on and `None` is returned, so one bad URL never aborts a batch.
pub struct Fetcher<T: Transport = Client> {
    transport: T,
    delay: Duration,
    max_retries: u32,
    sleeper: Box<dyn Fn(Duration)>,
}

impl Fetcher<Client> {
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Ok(Fetcher::new(build_client(config)?, config))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, config: &ScraperConfig) -> Self {
        Self {
            transport,
            delay: config.request_delay(),
            max_retries: config.max_retries,
            sleeper: Box::new(thread::sleep),
        }
    }

    /// Replace `thread::sleep`, e.g. to observe pacing.
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn fetch(&self, url: &str) -> Option<Page> {
        for attempt in 0..=self.max_retries {
            let outcome = self.transport.get_page(url);
            (self.sleeper)(self.delay);

            let failure = match outcome {
                Ok(page) if page.is_ok() => {
                    if attempt > 0 {
                        info!(%url, attempt, "succeeded after retry");
                    } else {
                        debug!(%url, "fetched");
                    }
                    return Some(page);
                }
                Ok(page) => format!("status {}", page.status),
                Err(e) => format!("{:#}", e),
            };

            if attempt < self.max_retries {
                warn!(%url, attempt = attempt + 1, error = %failure, "request failed, trying again");
                (self.sleeper)(self.delay);
            } else {
                error!(%url, attempts = attempt + 1, error = %failure, "giving up");
            }
        }
        None
    }

    /// One GET, no pacing and no status check.
    pub fn fetch_once(&self, url: &str) -> Option<Page> {
        match self.transport.get_page(url) {
            Ok(page) => Some(page),
            Err(e) => {
                error!(%url, error = %format!("{:#}", e), "request failed");
                None
            }
        }
    }
}
