// src/services/rate_limiter.rs
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid rate limit {0:?}, expected e.g. \"10/hour\" or \"10 per hour\"")]
pub struct ParseLimitError(pub String);

/// At most `count` hits per `period`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    pub count: u32,
    pub period: Duration,
}

impl FromStr for RateLimit {
    type Err = ParseLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLimitError(s.to_string());
        let trimmed = s.trim();
        let (count, unit) = trimmed
            .split_once('/')
            .or_else(|| trimmed.split_once(" per "))
            .ok_or_else(err)?;
        let count: u32 = count.trim().parse().map_err(|_| err())?;
        let secs = match unit.trim().trim_end_matches('s') {
            "second" => 1,
            "minute" => 60,
            "hour" => 60 * 60,
            "day" => 24 * 60 * 60,
            _ => return Err(err()),
        };
        Ok(RateLimit { count, period: Duration::from_secs(secs) })
    }
}

/// Parse a `;`-separated list such as `"50/day;10/hour"`. Empty input means no limits.
pub fn parse_limits(s: &str) -> Result<Vec<RateLimit>, ParseLimitError> {
    s.split(';')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug)]
struct Window {
    started: Instant,
    period: Duration,
    hits: u32,
}

impl Window {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= self.period
    }
}

/// Fixed-window limiter shared across requests, keyed by route scope and client.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<RwLock<HashMap<(String, String, usize), Window>>>,
    enabled: bool,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RateLimiter {
    pub fn new(enabled: bool) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            enabled,
        }
    }

    /// Record a hit for `client` on `scope`. Returns `false` without counting
    /// when any of `limits` is already exhausted.
    pub async fn check(&self, scope: &str, client: &str, limits: &[RateLimit]) -> bool {
        if !self.enabled || limits.is_empty() {
            return true;
        }

        let mut windows = self.inner.write().await;
        let now = Instant::now();

        for (idx, limit) in limits.iter().enumerate() {
            let window = windows
                .entry((scope.to_string(), client.to_string(), idx))
                .or_insert(Window { started: now, period: limit.period, hits: 0 });
            window.period = limit.period;
            if window.expired(now) {
                window.started = now;
                window.hits = 0;
            }
            if window.hits >= limit.count {
                return false;
            }
        }

        for idx in 0..limits.len() {
            if let Some(window) = windows.get_mut(&(scope.to_string(), client.to_string(), idx)) {
                window.hits += 1;
            }
        }
        true
    }

    /// Drop windows whose period has run out. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut windows = self.inner.write().await;
        let now = Instant::now();
        let before = windows.len();
        windows.retain(|_, w| !w.expired(now));
        before - windows.len()
    }
}

/// Periodically purge expired windows until the runtime shuts down.
pub fn spawn_purge_task(limiter: RateLimiter, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = limiter.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "purged expired rate limit windows");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_limit_strings() {
        assert_eq!(
            parse_limits("50/day;10/hour").unwrap(),
            vec![
                RateLimit { count: 50, period: Duration::from_secs(86_400) },
                RateLimit { count: 10, period: Duration::from_secs(3_600) },
            ]
        );
        assert_eq!(
            "200 per days".parse::<RateLimit>().unwrap(),
            RateLimit { count: 200, period: Duration::from_secs(86_400) }
        );
        assert!(parse_limits("").unwrap().is_empty());
        assert!(parse_limits("ten/hour").is_err());
        assert!(parse_limits("10/fortnight").is_err());
    }

    #[tokio::test]
    async fn blocks_after_tightest_limit() {
        let limiter = RateLimiter::new(true);
        let limits = parse_limits("5/day;2/hour").unwrap();

        assert!(limiter.check("/chat", "1.2.3.4", &limits).await);
        assert!(limiter.check("/chat", "1.2.3.4", &limits).await);
        assert!(!limiter.check("/chat", "1.2.3.4", &limits).await);

        // other clients and scopes are unaffected
        assert!(limiter.check("/chat", "5.6.7.8", &limits).await);
        assert!(limiter.check("/", "1.2.3.4", &limits).await);
    }

    #[tokio::test]
    async fn window_resets_after_period() {
        let limiter = RateLimiter::new(true);
        let limits = vec![RateLimit { count: 1, period: Duration::from_millis(10) }];

        assert!(limiter.check("/", "a", &limits).await);
        assert!(!limiter.check("/", "a", &limits).await);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(limiter.check("/", "a", &limits).await);
    }

    #[tokio::test]
    async fn purge_drops_expired_windows() {
        let limiter = RateLimiter::new(true);
        let short = vec![RateLimit { count: 1, period: Duration::from_millis(5) }];
        let long = parse_limits("1/hour").unwrap();

        for i in 0..1_000 {
            assert!(limiter.check("/chat", &format!("10.0.{}.{}", i / 256, i % 256), &short).await);
        }
        assert!(limiter.check("/", "keeper", &long).await);
        assert_eq!(limiter.inner.read().await.len(), 1_001);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(limiter.purge_expired().await, 1_000);

        // the live window still counts
        let windows = limiter.inner.read().await;
        assert_eq!(windows.len(), 1);
        assert!(windows.contains_key(&("/".to_string(), "keeper".to_string(), 0)));
        drop(windows);
        assert!(!limiter.check("/", "keeper", &long).await);
    }

    #[tokio::test]
    async fn purge_task_runs_in_background() {
        let limiter = RateLimiter::new(true);
        let limits = vec![RateLimit { count: 1, period: Duration::from_millis(5) }];
        assert!(limiter.check("/", "a", &limits).await);

        let handle = spawn_purge_task(limiter.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(limiter.inner.read().await.is_empty());
    }

    #[tokio::test]
    async fn disabled_limiter_allows_everything() {
        let limiter = RateLimiter::new(false);
        let limits = parse_limits("1/hour").unwrap();
        for _ in 0..5 {
            assert!(limiter.check("/chat", "a", &limits).await);
        }
    }
}
