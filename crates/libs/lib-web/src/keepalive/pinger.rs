//! # Keep-Alive Pinger
//!
//! Issues `GET <url>` on a schedule. The loop is `wait -> ping -> wait`; a ping
//! never blocks or fails a request, and no error ever leaves the task.

use super::stats::KeepAliveStats;
use reqwest::{Client, Url};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Upper bound on a single ping's duration.
const PING_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay schedule between pings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Period between pings while the target is healthy.
    pub interval: Duration,
    /// Delay before the first retry after a failure; doubles per further failure.
    pub retry_base: Duration,
    /// Failure streak at which failures are logged as errors.
    pub alert_threshold: u64,
}

impl BackoffPolicy {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            retry_base: Duration::from_secs(15).min(interval),
            alert_threshold: 3,
        }
    }

    /// Delay before the next ping given the current failure streak.
    ///
    /// Never longer than `interval`, so a failing target is probed at least as
    /// often as a healthy one.
    pub fn next_delay(&self, consecutive_failures: u64) -> Duration {
        if consecutive_failures == 0 {
            return self.interval;
        }
        let shift = u32::try_from(consecutive_failures - 1).unwrap_or(u32::MAX).min(16);
        self.retry_base
            .checked_mul(1u32 << shift)
            .unwrap_or(self.interval)
            .min(self.interval)
    }
}

/// Whether `url` points at this machine (`localhost` or a loopback address).
///
/// Such a ping keeps the task busy but never passes through the platform's
/// front door, so it does not prevent idling.
pub fn targets_loopback(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    match parsed.host_str() {
        Some(host) if host.eq_ignore_ascii_case("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

/// Result of one ping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingOutcome {
    Success,
    Status(u16),
    Transport(String),
}

/// Background self-pinger.
pub struct KeepAlive {
    http: Client,
    url: String,
    policy: BackoffPolicy,
    stats: Arc<KeepAliveStats>,
}

impl KeepAlive {
    pub fn new(url: impl Into<String>, policy: BackoffPolicy, stats: Arc<KeepAliveStats>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(PING_TIMEOUT.min(policy.interval))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build keep-alive HTTP client: {}", e))?;

        Ok(Self {
            http,
            url: url.into(),
            policy,
            stats,
        })
    }

    /// Perform one ping, log and count its outcome.
    pub async fn ping_once(&self) -> PingOutcome {
        let outcome = match self.http.get(&self.url).send().await {
            Ok(res) if res.status().is_success() => PingOutcome::Success,
            Ok(res) => PingOutcome::Status(res.status().as_u16()),
            Err(e) => PingOutcome::Transport(e.to_string()),
        };

        if outcome == PingOutcome::Success {
            self.stats.record_success();
            info!(url = %self.url, "Keep-alive ping successful");
            return outcome;
        }

        let streak = self.stats.record_failure();
        let alert = streak >= self.policy.alert_threshold;
        match (&outcome, alert) {
            (PingOutcome::Status(code), false) => {
                warn!(url = %self.url, status = code, streak, "Keep-alive ping failed with status code {}", code);
            }
            (PingOutcome::Status(code), true) => {
                error!(url = %self.url, status = code, streak, "Keep-alive ping keeps failing with status code {}", code);
            }
            (PingOutcome::Transport(e), false) => {
                warn!(url = %self.url, error = %e, streak, "Keep-alive ping error");
            }
            (PingOutcome::Transport(e), true) => {
                error!(url = %self.url, error = %e, streak, "Keep-alive ping keeps erroring");
            }
            (PingOutcome::Success, _) => {}
        }
        outcome
    }

    /// Run forever on a dedicated task. The handle is only used by tests.
    pub fn spawn(self) -> JoinHandle<()> {
        self.stats.set_enabled(true);
        if targets_loopback(&self.url) {
            warn!(url = %self.url, "KEEPALIVE_URL is a loopback address; set it to the public URL to keep the host awake");
        }
        info!(url = %self.url, interval_secs = self.policy.interval.as_secs(), "Keep-alive pinger started");

        tokio::spawn(async move {
            let mut delay = self.policy.interval;
            loop {
                tokio::time::sleep(delay).await;
                self.ping_once().await;
                delay = self.policy.next_delay(self.stats.consecutive_failures());
                debug!(next_in_secs = delay.as_secs(), "Next keep-alive ping scheduled");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::sync::Mutex;
    use tokio::time::Instant;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn pinger(url: String) -> (KeepAlive, Arc<KeepAliveStats>) {
        let stats = Arc::new(KeepAliveStats::new());
        let policy = BackoffPolicy::new(Duration::from_secs(300));
        (KeepAlive::new(url, policy, Arc::clone(&stats)).unwrap(), stats)
    }

    #[test]
    fn backoff_doubles_and_caps_at_interval() {
        let policy = BackoffPolicy::new(Duration::from_secs(300));
        assert_eq!(policy.next_delay(0), Duration::from_secs(300));
        assert_eq!(policy.next_delay(1), Duration::from_secs(15));
        assert_eq!(policy.next_delay(2), Duration::from_secs(30));
        assert_eq!(policy.next_delay(3), Duration::from_secs(60));
        assert_eq!(policy.next_delay(5), Duration::from_secs(240));
        assert_eq!(policy.next_delay(6), Duration::from_secs(300));
        assert_eq!(policy.next_delay(u64::MAX), Duration::from_secs(300));
    }

    #[test]
    fn retry_base_never_exceeds_short_interval() {
        let policy = BackoffPolicy::new(Duration::from_secs(5));
        assert_eq!(policy.next_delay(1), Duration::from_secs(5));
    }

    #[test]
    fn detects_loopback_targets() {
        assert!(targets_loopback("http://127.0.0.1:8080/ping"));
        assert!(targets_loopback("http://localhost:8080/ping"));
        assert!(targets_loopback("http://[::1]:8080/ping"));
        assert!(!targets_loopback("https://relay.onrender.com/ping"));
        assert!(!targets_loopback("http://10.0.0.5/ping"));
        assert!(!targets_loopback("not a url"));
    }

    #[tokio::test]
    async fn counts_success() {
        let base = serve(Router::new().route("/ping", get(|| async { "ok" }))).await;
        let (pinger, stats) = pinger(format!("{base}/ping"));

        assert_eq!(pinger.ping_once().await, PingOutcome::Success);
        assert_eq!(stats.report().successes, 1);
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let base = serve(Router::new().route(
            "/ping",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;
        let (pinger, stats) = pinger(format!("{base}/ping"));

        assert_eq!(pinger.ping_once().await, PingOutcome::Status(503));
        assert_eq!(stats.report().failures, 1);
        assert_eq!(stats.consecutive_failures(), 1);
    }

    #[tokio::test]
    async fn loop_keeps_pinging_on_backoff_after_failures() {
        let hits = Arc::new(Mutex::new(Vec::<Instant>::new()));
        let app = Router::new().route(
            "/ping",
            get({
                let hits = Arc::clone(&hits);
                move || {
                    hits.lock().unwrap().push(Instant::now());
                    async { StatusCode::SERVICE_UNAVAILABLE }
                }
            }),
        );
        let base = serve(app).await;

        let stats = Arc::new(KeepAliveStats::new());
        let policy = BackoffPolicy {
            interval: Duration::from_secs(1),
            retry_base: Duration::from_millis(50),
            alert_threshold: 3,
        };
        let started = Instant::now();
        let handle = KeepAlive::new(format!("{base}/ping"), policy, Arc::clone(&stats))
            .unwrap()
            .spawn();

        // Waits 1s, then retries after 50ms, 100ms, 200ms. A loop stuck on
        // the plain interval would need 4s for the same four pings.
        let deadline = started + Duration::from_secs(3);
        while hits.lock().unwrap().len() < 4 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let hits = hits.lock().unwrap().clone();
        assert!(hits.len() >= 4, "only {} pings before deadline", hits.len());
        assert!(hits[0] - started >= Duration::from_secs(1));

        let gaps: Vec<_> = hits.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps.iter().take(3).all(|g| *g < Duration::from_secs(1)), "{gaps:?}");
        assert!(gaps[2] > gaps[0], "{gaps:?}");

        assert!(!handle.is_finished());
        assert!(stats.report().enabled);
        assert!(stats.consecutive_failures() >= 4);
        handle.abort();
    }

    #[tokio::test]
    async fn transport_error_is_swallowed() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (pinger, stats) = pinger(format!("http://{addr}/ping"));
        assert!(matches!(pinger.ping_once().await, PingOutcome::Transport(_)));
        assert!(matches!(pinger.ping_once().await, PingOutcome::Transport(_)));
        assert_eq!(stats.consecutive_failures(), 2);
    }
}
