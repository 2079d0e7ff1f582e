//! Talk to the Foreman API
//!
//! Two endpoints matter to the check: the dashboard, which carries the
//! host counts, and the host search, which names the hosts behind a
//! non-zero count. Both answer JSON over basic-auth HTTPS; the server
//! runs a self-signed certificate so verification is off.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

/// Host counts from `/api/v2/dashboard`
#[derive(Debug, Deserialize)]
pub(crate) struct Dashboard {
    pub total_hosts: i64,
    pub ok_hosts: i64,
    pub out_of_sync_hosts: i64,
    pub bad_hosts: i64,
}

#[derive(Debug, Deserialize)]
struct HostSearch {
    results: Vec<HostEntry>,
}

#[derive(Debug, Deserialize)]
struct HostEntry {
    name: String,
}

pub(crate) enum ForemanError {
    Http(reqwest::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ForemanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ForemanError::Http(ref e) => write!(f, "{}", e),
            ForemanError::Json(ref e) => write!(f, "invalid dashboard response: {}", e),
        }
    }
}

impl From<reqwest::Error> for ForemanError {
    fn from(e: reqwest::Error) -> Self {
        ForemanError::Http(e)
    }
}

impl From<serde_json::Error> for ForemanError {
    fn from(e: serde_json::Error) -> Self {
        ForemanError::Json(e)
    }
}

/// The two host searches the dashboard counts correspond to
///
/// The search expressions are pre-encoded; a host is "bad" when its last
/// report is recent but failed, and "out of sync" when it simply hasn't
/// reported in half an hour.
#[derive(Clone, Copy, Debug)]
pub(crate) enum HostFilter {
    Bad,
    OutOfSync,
}

impl HostFilter {
    fn query(self) -> &'static str {
        match self {
            HostFilter::Bad => {
                "last_report+%3E+%2230+minutes+ago%22+and+%28status.failed+%3E+0+\
                 or+status.failed_restarts+%3E+0%29+and+status.enabled+%3D+true"
            }
            HostFilter::OutOfSync => {
                "last_report+%3C+%2230+minutes+ago%22+and+status.enabled+%3D+true"
            }
        }
    }
}

pub(crate) struct Foreman {
    client: Client,
    host: String,
    user: String,
    password: String,
}

impl Foreman {
    pub fn new(
        host: &str,
        user: &str,
        password: &str,
        timeout: f64,
    ) -> Result<Foreman, ForemanError> {
        let client = Client::builder()
            .timeout(Duration::from_secs_f64(timeout))
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Foreman {
            client,
            host: host.into(),
            user: user.into(),
            password: password.into(),
        })
    }

    fn get(&self, url: &str) -> Result<String, ForemanError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.user, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .send()?;
        Ok(response.text()?)
    }

    /// Fetch the dashboard counts, timing the request
    pub fn dashboard(&self) -> Result<(Dashboard, Duration), ForemanError> {
        let url = format!("https://{}/api/v2/dashboard", self.host);
        let started = Instant::now();
        let body = self.get(&url)?;
        let elapsed = started.elapsed();
        let dashboard = serde_json::from_str(&body)?;
        Ok((dashboard, elapsed))
    }

    /// Space-separated names of the hosts behind one of the counts
    pub fn hostnames(&self, filter: HostFilter) -> Result<String, ForemanError> {
        let url = format!(
            "https://{}/api/v2/hosts?search={}",
            self.host,
            filter.query()
        );
        let body = self.get(&url)?;
        let search: HostSearch = serde_json::from_str(&body)?;
        let names: Vec<String> = search.results.into_iter().map(|h| h.name).collect();
        Ok(names.join(" "))
    }
}
