use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

// Absorbs float rounding so a bucket refilled for exactly one period grants a token
const TOKEN_EPSILON: f64 = 1e-9;

/// Refill rate of a token bucket, in tokens per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit(f64);

impl Limit {
    /// Every request is allowed, regardless of burst.
    pub const INFINITE: Limit = Limit(f64::INFINITY);

    /// One token per `period`. A zero period means no limit at all.
    pub fn every(period: Duration) -> Self {
        if period.is_zero() {
            return Self::INFINITE;
        }
        Limit(1.0 / period.as_secs_f64())
    }

    /// `rate` tokens per second; negative or NaN rates are treated as zero.
    pub fn per_second(rate: f64) -> Self {
        Limit(rate.max(0.0))
    }

    pub fn as_per_second(self) -> f64 {
        self.0
    }

    pub fn is_infinite(self) -> bool {
        self.0.is_infinite()
    }

    /// Time between two refilled tokens.
    ///
    /// `None` for a rate of zero, or one so slow the interval overflows `Duration`.
    pub fn interval(self) -> Option<Duration> {
        if self.is_infinite() {
            Some(Duration::ZERO)
        } else if self.0 <= 0.0 {
            None
        } else {
            Duration::try_from_secs_f64(1.0 / self.0).ok()
        }
    }
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_rate: f64) -> Self {
        Self {
            tokens: capacity,
            capacity,
            refill_rate,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();

        // inf * 0.0 is NaN, so an unlimited bucket is simply kept full
        if self.refill_rate.is_infinite() {
            self.tokens = self.capacity;
        } else {
            let tokens_to_add = elapsed * self.refill_rate;
            self.tokens = (self.tokens + tokens_to_add).min(self.capacity);
        }
        self.last_refill = now;
    }

    fn try_acquire(&mut self) -> bool {
        if self.refill_rate.is_infinite() {
            return true;
        }

        self.refill();

        if self.tokens + TOKEN_EPSILON >= 1.0 {
            self.tokens = (self.tokens - 1.0).max(0.0);
            true
        } else {
            false
        }
    }

    /// `None` when no token will ever become available, including waits too long
    /// to represent as a `Duration`.
    fn time_until_next_token(&self) -> Option<Duration> {
        if self.tokens + TOKEN_EPSILON >= 1.0 || self.refill_rate.is_infinite() {
            Some(Duration::from_secs(0))
        } else if self.capacity < 1.0 || self.refill_rate <= 0.0 {
            None
        } else {
            let tokens_needed = 1.0 - self.tokens;
            let seconds = tokens_needed / self.refill_rate;
            Duration::try_from_secs_f64(seconds.max(0.0)).ok()
        }
    }
}

/// Token bucket rate limiter.
///
/// The bucket starts full (`burst` tokens) and refills continuously at `limit`.
/// Clones share the same bucket, so a limiter can be handed to several tasks.
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
    limit: Limit,
    burst: u32,
}

impl RateLimiter {
    pub fn new(limit: Limit, burst: u32) -> Self {
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket::new(
                f64::from(burst),
                limit.as_per_second(),
            ))),
            limit,
            burst,
        }
    }

    /// Limiter that grants one token per `period`, holding at most `burst`.
    pub fn every(period: Duration, burst: u32) -> Self {
        Self::new(Limit::every(period), burst)
    }

    pub fn limit(&self) -> Limit {
        self.limit
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    /// Acquire a token, waiting until one is available.
    ///
    /// Fails immediately if the limiter can never grant a token: zero burst, a
    /// drained bucket with a refill rate of zero, or a wait longer than
    /// `Duration::MAX`.
    #[tracing::instrument(skip(self))]
    pub async fn acquire(&self) -> anyhow::Result<()> {
        loop {
            let wait_duration = {
                let mut bucket = self.bucket.lock().await;

                if bucket.try_acquire() {
                    tracing::trace!(
                        tokens_remaining = bucket.tokens,
                        "Rate limit token acquired"
                    );
                    return Ok(()); // Token acquired successfully
                }

                bucket.time_until_next_token().ok_or_else(|| {
                    anyhow::anyhow!(
                        "Rate limiter can never grant a token (limit: {}/s, burst: {})",
                        self.limit.as_per_second(),
                        self.burst
                    )
                })?
            };

            if wait_duration > Duration::from_secs(0) {
                tracing::debug!(
                    wait_ms = wait_duration.as_millis(),
                    "Rate limit reached, waiting for token"
                );
                tokio::time::sleep(wait_duration).await;
            }
        }
    }

    /// Try to acquire a token without blocking
    #[tracing::instrument(skip(self))]
    pub async fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock().await;

        let acquired = bucket.try_acquire();

        if acquired {
            tracing::trace!(
                tokens_remaining = bucket.tokens,
                "Rate limit token acquired (non-blocking)"
            );
        } else {
            tracing::trace!(
                tokens_remaining = bucket.tokens,
                "Rate limit token not available"
            );
        }

        acquired
    }

    /// Get the current number of available tokens
    #[tracing::instrument(skip(self))]
    pub async fn available_tokens(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;

        bucket.refill();
        bucket.tokens
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limit", &self.limit)
            .field("burst", &self.burst)
            .finish()
    }
}
