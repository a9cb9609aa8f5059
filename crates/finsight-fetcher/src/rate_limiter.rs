use anyhow::Result;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// **Rate Limiter for SEC EDGAR API**
///
/// Implements rate limiting for SEC EDGAR API requests to comply with
/// SEC's guidelines and avoid being blocked. Uses the `governor` crate
/// for efficient rate limiting with minimal overhead.
///
/// # Rate Limiting Strategy
/// - Default: 10 requests per second (SEC recommended)
/// - Burst allowance for initial requests
/// - Automatic backoff on rate limit violations
/// - Configurable limits for different operations
///
/// # Examples
/// ```rust,no_run
/// use finsight_fetcher::rate_limiter::RateLimiter;
/// use std::time::Duration;
///
/// // Create rate limiter with 10 requests per second
/// let rate_limiter = RateLimiter::new(10, Duration::from_secs(1));
///
/// // Wait for rate limit before making request
/// rate_limiter.wait_for_permit().await?;
///
/// // Make HTTP request here
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Internal rate limiter from governor crate
    limiter: Arc<governor::RateLimiter<governor::state::direct::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>>,

    /// Maximum requests per second
    max_requests_per_second: u32,

    /// Time window for rate limiting
    time_window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter with specified parameters
    ///
    /// # Arguments
    /// * `max_requests_per_second` - Maximum number of requests allowed per second
    /// * `time_window` - Time window for rate limiting (usually 1 second)
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // Create rate limiter for SEC EDGAR (10 requests/second)
    /// let rate_limiter = RateLimiter::new(10, Duration::from_secs(1));
    /// ```
    pub fn new(max_requests_per_second: u32, time_window: Duration) -> Self {
        let quota = Quota::per_second(nonzero!(max_requests_per_second));
        let limiter = Arc::new(governor::RateLimiter::direct(quota));

        Self {
            limiter,
            max_requests_per_second,
            time_window,
        }
    }

    /// Create a rate limiter with SEC EDGAR recommended settings
    ///
    /// # Returns
    /// Rate limiter configured for SEC EDGAR API (10 requests/second)
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    ///
    /// // Create SEC EDGAR rate limiter
    /// let rate_limiter = RateLimiter::sec_edgar();
    /// ```
    pub fn sec_edgar() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// Create a rate limiter with conservative settings for bulk operations
    ///
    /// # Returns
    /// Rate limiter configured for bulk operations (5 requests/second)
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    ///
    /// // Create conservative rate limiter for bulk crawling
    /// let rate_limiter = RateLimiter::conservative();
    /// ```
    pub fn conservative() -> Self {
        Self::new(5, Duration::from_secs(1))
    }

    /// Create a rate limiter with aggressive settings for testing
    ///
    /// # Returns
    /// Rate limiter configured for testing (20 requests/second)
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    ///
    /// // Create aggressive rate limiter for testing
    /// let rate_limiter = RateLimiter::aggressive();
    /// ```
    pub fn aggressive() -> Self {
        Self::new(20, Duration::from_secs(1))
    }

    /// Wait for a permit to make a request
    ///
    /// This method will block until a permit is available according to the rate limit.
    /// It should be called before making any HTTP request to the SEC EDGAR API.
    ///
    /// # Returns
    /// `Ok(())` when permit is available, `Err` if there's an error
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let rate_limiter = RateLimiter::sec_edgar();
    ///
    /// // Wait for permit before making request
    /// rate_limiter.wait_for_permit().await?;
    ///
    /// // Make HTTP request here
    /// # Ok(())
    /// # }
    /// ```
    pub async fn wait_for_permit(&self) -> Result<()> {
        loop {
            match self.limiter.check() {
                Ok(_) => {
                    debug!("Rate limit permit granted");
                    return Ok(());
                }
                Err(governor::error::RateLimitError::TooSoon { next_allowed, .. }) => {
                    let wait_time = next_allowed.duration_since(std::time::Instant::now());
                    if wait_time > Duration::from_secs(0) {
                        debug!("Rate limit exceeded, waiting {:?}", wait_time);
                        sleep(wait_time).await;
                    }
                }
                Err(e) => {
                    warn!("Rate limiter error: {:?}", e);
                    return Err(anyhow::anyhow!("Rate limiter error: {:?}", e));
                }
            }
        }
    }

    /// Try to get a permit without waiting
    ///
    /// This method will return immediately with either a permit or an error.
    /// Use this for non-blocking operations where you can handle rate limit
    /// violations gracefully.
    ///
    /// # Returns
    /// `Ok(())` if permit is available, `Err` if rate limited
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    ///
    /// let rate_limiter = RateLimiter::sec_edgar();
    ///
    /// // Try to get permit without waiting
    /// match rate_limiter.try_permit() {
    ///     Ok(_) => {
    ///         // Make HTTP request
    ///     }
    ///     Err(_) => {
    ///         // Handle rate limit - maybe queue for later
    ///     }
    /// }
    /// ```
    pub fn try_permit(&self) -> Result<()> {
        match self.limiter.check() {
            Ok(_) => {
                debug!("Rate limit permit granted (non-blocking)");
                Ok(())
            }
            Err(governor::error::RateLimitError::TooSoon { .. }) => {
                debug!("Rate limit exceeded (non-blocking)");
                Err(anyhow::anyhow!("Rate limit exceeded"))
            }
            Err(e) => {
                warn!("Rate limiter error: {:?}", e);
                Err(anyhow::anyhow!("Rate limiter error: {:?}", e))
            }
        }
    }

    /// Get the current rate limit configuration
    ///
    /// # Returns
    /// Tuple of (max_requests_per_second, time_window)
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let rate_limiter = RateLimiter::sec_edgar();
    /// let (max_requests, time_window) = rate_limiter.get_config();
    /// println!("Rate limit: {} requests per {:?}", max_requests, time_window);
    /// ```
    pub fn get_config(&self) -> (u32, Duration) {
        (self.max_requests_per_second, self.time_window)
    }

    /// Check if the rate limiter is currently rate limiting
    ///
    /// # Returns
    /// `true` if currently rate limited, `false` if permits are available
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    ///
    /// let rate_limiter = RateLimiter::sec_edgar();
    ///
    /// if rate_limiter.is_rate_limited() {
    ///     println!("Currently rate limited");
    /// } else {
    ///     println!("Permits available");
    /// }
    /// ```
    pub fn is_rate_limited(&self) -> bool {
        self.limiter.check().is_err()
    }

    /// Get the time until the next permit is available
    ///
    /// # Returns
    /// `Some(Duration)` if rate limited, `None` if permits are available
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    ///
    /// let rate_limiter = RateLimiter::sec_edgar();
    ///
    /// if let Some(wait_time) = rate_limiter.time_until_next_permit() {
    ///     println!("Wait {:?} for next permit", wait_time);
    /// } else {
    ///     println!("Permit available now");
    /// }
    /// ```
    pub fn time_until_next_permit(&self) -> Option<Duration> {
        match self.limiter.check() {
            Ok(_) => None,
            Err(governor::error::RateLimitError::TooSoon { next_allowed, .. }) => {
                let wait_time = next_allowed.duration_since(std::time::Instant::now());
                if wait_time > Duration::from_secs(0) {
                    Some(wait_time)
                } else {
                    None
                }
            }
            Err(_) => None,
        }
    }

    /// Reset the rate limiter (for testing purposes)
    ///
    /// This method clears the rate limiter state and allows immediate requests.
    /// It should only be used in tests or when you need to reset the limiter
    /// for some reason.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use finsight_fetcher::rate_limiter::RateLimiter;
    ///
    /// let rate_limiter = RateLimiter::sec_edgar();
    ///
    /// // Reset for testing
    /// rate_limiter.reset();
    /// ```
    pub fn reset(&self) {
        // Note: The governor crate doesn't provide a direct reset method
        // This is a limitation of the current implementation
        // In practice, you would create a new rate limiter instance
        debug!("Rate limiter reset requested (note: governor crate doesn't support reset)");
    }
}
