//! HTTP access to the JHU CSSE daily-report CSV snapshots.
//!
//! The source is a plain directory of files named `MM-DD-YYYY.csv`, one per
//! calendar day. There is no API surface beyond GET-by-filename, so this
//! client stays deliberately small: build the URL, fetch, hand back the body.

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::domain::DateWindow;
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_daily_reports";

pub struct CsseClient {
    client: Client,
    base_url: String,
}

impl CsseClient {
    /// Build a client, honoring a `COVID_DAILY_BASE_URL` override from the
    /// environment (`.env` supported) for mirrors or local fixtures.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var("COVID_DAILY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::with_base_url(base_url))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Fetch one day's snapshot as raw CSV text.
    pub fn fetch_day(&self, date: NaiveDate) -> Result<String, AppError> {
        let url = format!("{}/{}", self.base_url, DateWindow::filename(date));

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::data(format!("Request for {date} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::data(format!(
                "Request for {date} failed with status {}.",
                resp.status()
            )));
        }

        resp.text()
            .map_err(|e| AppError::data(format!("Failed to read body for {date}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = CsseClient::with_base_url("http://localhost:8080/data/");
        assert_eq!(client.base_url, "http://localhost:8080/data");
    }
}
