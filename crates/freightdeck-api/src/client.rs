use std::time::Duration;

use thiserror::Error;

use crate::wire::{
    BookingDto, BookingPatch, CustomerDto, DashboardStatsDto, FinancialSummaryDto, NewBookingDto,
};

const DEFAULT_API_BASE: &str = "http://localhost:5000/api";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    /// A request that was superseded before it settled. Callers must treat
    /// this as a no-op, never as a failure.
    #[error("request cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Cancellations are suppressed from error reporting and logs, so give
    /// callers an explicit check instead of making them sniff error shapes.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// HTTP client for the CRM backend.
pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
}

impl CrmClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE.to_string())
    }

    /// For staging backends or tests against a local fixture server.
    pub fn with_base_url(base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("Freightdeck/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get_bookings(&self) -> Result<Vec<BookingDto>> {
        self.get_json("bookings").await
    }

    pub async fn get_all_customers(&self) -> Result<Vec<CustomerDto>> {
        self.get_json("customers").await
    }

    pub async fn get_dashboard_stats(&self) -> Result<DashboardStatsDto> {
        self.get_json("dashboard/stats").await
    }

    pub async fn get_dashboard_recent_customers(&self) -> Result<Vec<CustomerDto>> {
        self.get_json("dashboard/recent-customers").await
    }

    pub async fn get_dashboard_recent_bookings(&self) -> Result<Vec<BookingDto>> {
        self.get_json("dashboard/recent-bookings").await
    }

    pub async fn get_dashboard_financial_summary(&self) -> Result<FinancialSummaryDto> {
        self.get_json("dashboard/financial-summary").await
    }

    pub async fn create_booking(&self, data: &NewBookingDto) -> Result<BookingDto> {
        let url = format!("{}/bookings", self.base_url);
        let response = self.client.post(&url).json(data).send().await?;
        let response = Self::check_status(response, "bookings").await?;
        Ok(response.json().await?)
    }

    pub async fn update_booking(&self, id: i64, data: &BookingPatch) -> Result<BookingDto> {
        let url = format!("{}/bookings/{}", self.base_url, id);
        let response = self.client.put(&url).json(data).send().await?;
        let response = Self::check_status(response, &format!("bookings/{}", id)).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_booking(&self, id: i64) -> Result<()> {
        let url = format!("{}/bookings/{}", self.base_url, id);
        let response = self.client.delete(&url).send().await?;
        Self::check_status(response, &format!("bookings/{}", id)).await?;
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response, path).await?;
        Ok(response.json().await?)
    }

    async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }
        Ok(response)
    }
}

impl Default for CrmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = CrmClient::with_base_url("http://crm.internal/api/".into());
        assert_eq!(client.base_url, "http://crm.internal/api");
    }

    #[test]
    fn test_cancellation_marker() {
        assert!(ApiError::Cancelled.is_cancellation());
        assert!(!ApiError::RequestFailed("boom".into()).is_cancellation());
        assert!(!ApiError::NotFound("bookings".into()).is_cancellation());
    }
}
