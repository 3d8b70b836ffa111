//! Hash-lookup HTTP client
//!
//! Identifies a ROM by CRC against the remote game database. Two pieces
//! of discipline matter here:
//!
//! - **Rate limiting**: the provider enforces a per-user request rate, so
//!   each client instance blocks until a minimum interval has elapsed
//!   since its previous request. Fixed window, not token bucket: no
//!   bursts after idle periods. This is also why the engine runs lookups
//!   one file at a time - the client assumes exclusive ownership of its
//!   timing state (the internal mutex serialises stray concurrent use).
//! - **Retries**: transient failures back off exponentially against a
//!   bounded budget. A 429 backs off longer but does NOT consume the
//!   budget; 404 is an answer, not an error; 401/403 is fatal.

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{adapter, dto};
use crate::artwork::domain::{ArtworkError, GameInfo};
use crate::platforms::Platform;

/// Additional attempts beyond the first.
const MAX_RETRIES: u32 = 3;
/// First transient-retry delay; doubles per retry.
const BASE_BACKOFF: Duration = Duration::from_millis(500);
/// Ceiling for any computed backoff.
const MAX_BACKOFF: Duration = Duration::from_secs(8);
/// First rate-limit delay; doubles per consecutive 429.
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(2);

const API_BASE_URL: &str = "https://api.screenscraper.fr/api2";

/// Credentials for the hash-lookup API.
///
/// Developer credentials identify the application; user credentials are
/// optional and raise the caller's rate allowance.
#[derive(Debug, Clone, Default)]
pub struct HashDbCredentials {
    pub dev_id: String,
    pub dev_password: String,
    /// Application name reported in `softname`
    pub software_name: String,
    pub user_id: String,
    pub user_password: String,
}

/// Rate-limited, retrying client for the hash-lookup API.
pub struct HashDbClient {
    http_client: reqwest::Client,
    base_url: String,
    credentials: HashDbCredentials,
    min_interval: Duration,
    /// Timing state for the fixed-window limiter. Held across the wait so
    /// overlapping callers serialise instead of racing the window.
    last_request: Mutex<Option<Instant>>,
}

impl HashDbClient {
    pub fn new(credentials: HashDbCredentials, min_interval: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: API_BASE_URL.to_string(),
            credentials,
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Create a client for testing with custom base URL.
    #[cfg(test)]
    pub fn with_base_url(
        credentials: HashDbCredentials,
        min_interval: Duration,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Look up a game by content hash.
    ///
    /// `Ok(None)` means the database does not know this hash (HTTP 404) -
    /// an answer, not a failure.
    pub async fn lookup(
        &self,
        crc: &str,
        platform: &Platform,
        file_name: &str,
        file_size: u64,
    ) -> Result<Option<GameInfo>, ArtworkError> {
        let url = self.build_url(crc, platform, file_name, file_size);
        let mut retry = RetryState::new();

        loop {
            self.wait_for_window().await;

            match self.send(&url).await {
                Ok(body) => {
                    return adapter::to_game_info(body).map(Some);
                }
                Err(error) => match retry.next_step(error) {
                    RetryStep::NotFound => {
                        debug!("Hash {} not in database", crc);
                        return Ok(None);
                    }
                    RetryStep::GiveUp(err) => return Err(err),
                    RetryStep::Backoff(delay) => tokio::time::sleep(delay).await,
                },
            }
        }
    }

    /// Block until the minimum inter-request interval has elapsed.
    async fn wait_for_window(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn build_url(&self, crc: &str, platform: &Platform, file_name: &str, file_size: u64) -> String {
        format!(
            "{}/jeuInfos.php?devid={}&devpassword={}&softname={}&ssid={}&sspassword={}&output=json&crc={}&systemeid={}&romtype=rom&romnom={}&romtaille={}",
            self.base_url,
            urlencoding::encode(&self.credentials.dev_id),
            urlencoding::encode(&self.credentials.dev_password),
            urlencoding::encode(&self.credentials.software_name),
            urlencoding::encode(&self.credentials.user_id),
            urlencoding::encode(&self.credentials.user_password),
            crc,
            platform.hashdb_id,
            urlencoding::encode(file_name),
            file_size
        )
    }

    /// One request/response cycle, classified for the retry loop.
    async fn send(&self, url: &str) -> Result<dto::JeuInfosResponse, SendError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| SendError::Transient(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SendError::NotFound);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SendError::RateLimited);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::AuthRejected(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }
        if !status.is_success() {
            return Err(SendError::Transient(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<dto::JeuInfosResponse>()
            .await
            .map_err(|e| SendError::Parse(e.to_string()))
    }
}

/// Internal classification of one request's outcome.
#[derive(Debug)]
enum SendError {
    NotFound,
    RateLimited,
    AuthRejected(String),
    Parse(String),
    Transient(String),
}

/// What the retry loop should do after one failed attempt.
#[derive(Debug)]
enum RetryStep {
    /// The database does not know this hash; answer `Ok(None)`.
    NotFound,
    /// Fatal or budget-exhausted; surface this error.
    GiveUp(ArtworkError),
    /// Sleep for this long, then send again.
    Backoff(Duration),
}

/// Counters for one lookup's retry loop.
///
/// Transient failures consume the retry budget; rate limiting does not.
/// Each kind of failure scales its own backoff independently.
struct RetryState {
    attempt: u32,
    rate_limit_hits: u32,
}

impl RetryState {
    fn new() -> Self {
        Self {
            attempt: 0,
            rate_limit_hits: 0,
        }
    }

    /// Classify one failed attempt into the loop's next step.
    fn next_step(&mut self, error: SendError) -> RetryStep {
        match error {
            SendError::NotFound => RetryStep::NotFound,
            SendError::AuthRejected(detail) => RetryStep::GiveUp(ArtworkError::AuthRejected(detail)),
            SendError::Parse(detail) => RetryStep::GiveUp(ArtworkError::Parse(detail)),
            SendError::RateLimited => {
                let delay = scaled_backoff(RATE_LIMIT_BACKOFF, self.rate_limit_hits);
                warn!(
                    "Hash lookup rate limited; waiting {:?} before retrying attempt {}",
                    delay, self.attempt
                );
                self.rate_limit_hits += 1;
                RetryStep::Backoff(delay)
            }
            SendError::Transient(detail) => {
                if self.attempt >= MAX_RETRIES {
                    return RetryStep::GiveUp(ArtworkError::Network(detail));
                }
                let delay = scaled_backoff(BASE_BACKOFF, self.attempt);
                debug!(
                    "Hash lookup attempt {} failed ({}); retrying in {:?}",
                    self.attempt, detail, delay
                );
                self.attempt += 1;
                RetryStep::Backoff(delay)
            }
        }
    }
}

/// Exponential backoff: `base * 2^exponent`, capped.
fn scaled_backoff(base: Duration, exponent: u32) -> Duration {
    base.saturating_mul(1u32 << exponent.min(4)).min(MAX_BACKOFF)
}
