//! USGS FDSN event service client.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{debug, info};

use quake_ingest::read_raw_table_from_reader;

use crate::error::{FetchError, Result};

/// FDSN event query endpoint.
pub const FDSN_EVENT_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// Default output file; the name makes provenance inference tag it USGS.
pub const DEFAULT_OUTPUT: &str = "JAPAN_USGS.csv";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => NaiveDate::MIN,
    }
}

/// Window used for the published Japan catalog snapshot.
pub const DEFAULT_START: NaiveDate = date(2025, 9, 15);
pub const DEFAULT_END: NaiveDate = date(2025, 10, 19);

/// Parameters of one FDSN event query. Defaults cover the Japan bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct UsgsQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_magnitude: f64,
}

impl Default for UsgsQuery {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
            min_latitude: 24.0,
            max_latitude: 46.0,
            min_longitude: 123.0,
            max_longitude: 146.0,
            min_magnitude: 0.0,
        }
    }
}

impl UsgsQuery {
    #[must_use]
    pub fn with_window(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Full request URL with `format=csv`.
    pub fn url(&self) -> Result<Url> {
        if self.start > self.end {
            return Err(FetchError::InvalidRange {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        let params = [
            ("format", "csv".to_string()),
            ("starttime", self.start.format("%Y-%m-%d").to_string()),
            ("endtime", self.end.format("%Y-%m-%d").to_string()),
            ("minlatitude", self.min_latitude.to_string()),
            ("maxlatitude", self.max_latitude.to_string()),
            ("minlongitude", self.min_longitude.to_string()),
            ("maxlongitude", self.max_longitude.to_string()),
            ("minmagnitude", self.min_magnitude.to_string()),
        ];
        Url::parse_with_params(FDSN_EVENT_URL, &params).map_err(|err| FetchError::Url(err.to_string()))
    }
}

/// What a download produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub path: PathBuf,
    pub bytes: usize,
    /// Event rows below the header.
    pub rows: usize,
}

/// Number of data rows in a CSV body.
pub fn count_event_rows(body: &str) -> Result<usize> {
    Ok(read_raw_table_from_reader(body.as_bytes())?.height())
}

/// Blocking client for the FDSN event service.
pub struct UsgsClient {
    client: Client,
}

impl UsgsClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Downloads the CSV body for `query`. Non-success statuses are errors.
    pub fn fetch_csv(&self, query: &UsgsQuery) -> Result<String> {
        let url = query.url()?;
        debug!(%url, "requesting catalog");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, format!("quake/{}", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "text/csv")
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Http {
                status,
                message: message.trim().to_string(),
            });
        }
        Ok(response.text()?)
    }

    /// Downloads and writes the body to `path`.
    pub fn save(&self, query: &UsgsQuery, path: &Path) -> Result<FetchReport> {
        let body = self.fetch_csv(query)?;
        let rows = count_event_rows(&body)?;
        write_body(path, &body)?;
        info!(path = %path.display(), bytes = body.len(), rows, "catalog saved");
        Ok(FetchReport {
            path: path.to_path_buf(),
            bytes: body.len(),
            rows,
        })
    }
}

fn write_body(path: &Path, body: &str) -> Result<()> {
    let write_error = |source| FetchError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, body).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_url() {
        let url = UsgsQuery::default().url().unwrap();
        assert_eq!(url.host_str(), Some("earthquake.usgs.gov"));
        assert_eq!(url.path(), "/fdsnws/event/1/query");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("format".into(), "csv".into())));
        assert!(pairs.contains(&("starttime".into(), "2025-09-15".into())));
        assert!(pairs.contains(&("endtime".into(), "2025-10-19".into())));
        assert!(pairs.contains(&("minlatitude".into(), "24".into())));
        assert!(pairs.contains(&("maxlongitude".into(), "146".into())));
        assert!(pairs.contains(&("minmagnitude".into(), "0".into())));
    }

    #[test]
    fn reversed_window_is_rejected() {
        let query = UsgsQuery::default().with_window(DEFAULT_END, DEFAULT_START);
        assert!(matches!(query.url(), Err(FetchError::InvalidRange { .. })));
    }

    #[test]
    fn counts_rows_below_header() {
        let body = "time,latitude,longitude,depth,mag\n\
                    2025-10-01T00:00:00.000Z,35.0,139.0,10,5.2\n\
                    2025-10-02T00:00:00.000Z,36.0,140.0,20,4.1\n";
        assert_eq!(count_event_rows(body).unwrap(), 2);
        assert_eq!(count_event_rows("").unwrap(), 0);
    }

    #[test]
    fn writes_body_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw/JAPAN_USGS.csv");
        write_body(&path, "time\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "time\n");
    }
}
