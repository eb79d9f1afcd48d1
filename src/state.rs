//! Application state for one generator session
//!
//! Holds the raw ASN input, the latest fetch results and the display
//! settings. Output is always derived from the current state, never stored.

use crate::client::{Router, Transport, fetch_all};
use crate::models::{AsnResult, normalize_asns};
use crate::output::{DisplayConfig, Stats, Vendor, generate};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub input_asns: String,
    pub results: Vec<AsnResult>,
    pub loading: bool,
    pub display: DisplayConfig,
}

impl AppState {
    pub fn new(display: DisplayConfig) -> Self {
        Self {
            display,
            ..Self::default()
        }
    }

    pub fn set_input(&mut self, raw: impl Into<String>) {
        self.input_asns = raw.into();
    }

    pub fn set_vendor(&mut self, vendor: Vendor) {
        self.display.vendor = vendor;
    }

    pub fn set_merge(&mut self, merge: bool) {
        self.display.merge = merge;
    }

    pub fn set_show_ipv4(&mut self, show: bool) {
        self.display.show_ipv4 = show;
    }

    pub fn set_show_ipv6(&mut self, show: bool) {
        self.display.show_ipv6 = show;
    }

    /// Normalize the current input and fetch every ASN.
    ///
    /// Blank input leaves the previous results untouched. Otherwise the
    /// results are replaced wholesale, in normalized input order.
    pub async fn fetch_asns<T: Transport>(&mut self, router: &Router<T>) {
        if self.input_asns.trim().is_empty() {
            return;
        }

        self.loading = true;
        self.results.clear();

        let asns = normalize_asns(&self.input_asns);
        log::debug!("Normalized input to {} ASNs", asns.len());
        self.results = fetch_all(router, &asns).await;

        self.loading = false;
    }

    pub fn stats(&self) -> Stats {
        Stats::from_results(&self.results)
    }

    pub fn formatted_output(&self) -> String {
        generate(&self.results, &self.display)
    }
}
