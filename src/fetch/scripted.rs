// src/fetch/scripted.rs
//
// In-memory transport for tests.

use anyhow::{anyhow, Result};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use super::{Page, Transport};

/// Replays scripted responses per URL. The last response for a URL repeats;
/// unscripted URLs fail at the transport level.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<HashMap<String, VecDeque<Page>>>,
    calls: RefCell<HashMap<String, usize>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(Page {
                status,
                body: body.to_string(),
            });
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.borrow().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }
}

impl Transport for ScriptedTransport {
    fn get_page(&self, url: &str) -> Result<Page> {
        *self.calls.borrow_mut().entry(url.to_string()).or_default() += 1;
        let mut responses = self.responses.borrow_mut();
        let queue = responses
            .get_mut(url)
            .ok_or_else(|| anyhow!("connection refused: {}", url))?;
        let page = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        page.ok_or_else(|| anyhow!("no response scripted for {}", url))
    }
}

/// A sleeper that records requested delays instead of sleeping.
pub fn recording_sleeper() -> (impl Fn(Duration) + 'static, Rc<RefCell<Vec<Duration>>>) {
    let sleeps = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&sleeps);
    (move |d| log.borrow_mut().push(d), sleeps)
}

/// A sleeper that does nothing.
pub fn no_sleep(_: Duration) {}

/// Route `tracing` output to the test harness; safe to call repeatedly.
pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,form990scraper=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
