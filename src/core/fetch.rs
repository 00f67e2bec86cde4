use crate::config::FetchPolicy;
use crate::domain::ports::RecordSource;
use crate::utils::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;

/// GET-only JSON fetcher. Transient 5xx responses are retried with exponential
/// backoff; every other failure is returned on the first attempt.
///
/// A client that fails to build is kept as an error and reported by `fetch`,
/// so the run still validates its configuration first and notifies once.
pub struct HttpFetcher {
    client: Result<Client, String>,
    policy: FetchPolicy,
}

impl HttpFetcher {
    pub fn new(policy: FetchPolicy) -> Self {
        let client = Client::builder()
            .timeout(policy.timeout)
            .connect_timeout(policy.timeout)
            .build()
            .map_err(|e| e.to_string());
        Self { client, policy }
    }

    #[cfg(test)]
    pub(crate) fn without_client(policy: FetchPolicy, reason: &str) -> Self {
        Self {
            client: Err(reason.to_string()),
            policy,
        }
    }
}

#[async_trait]
impl RecordSource for HttpFetcher {
    async fn fetch(&self, endpoint: &str) -> Result<serde_json::Value, FetchError> {
        let client = self
            .client
            .as_ref()
            .map_err(|e| FetchError::Unexpected(format!("HTTP client unavailable: {}", e)))?;
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        tracing::info!("📡 Fetching data from API...");

        let response = loop {
            tracing::debug!("Making API request to: {} (attempt {})", endpoint, attempt);
            let response = client.get(endpoint).send().await?;
            let status = response.status().as_u16();
            tracing::debug!("API response status: {}", status);

            if self.policy.is_transient(status) && attempt < max_attempts {
                let delay = self.policy.backoff(attempt);
                tracing::warn!(
                    "🔄 API returned {} on attempt {}/{}, retrying in {:?}",
                    status,
                    attempt,
                    max_attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }
            break response;
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("✅ Data fetched successfully! Status Code: {}", status.as_u16());

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| FetchError::InvalidResponseFormat(e.to_string()))
    }
}
