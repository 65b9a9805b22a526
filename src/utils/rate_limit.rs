use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

/// SEC fair-access policy: no more than ten requests in flight.
pub const EDGAR_MAX_CONCURRENT: usize = 10;

pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
}

static EDGAR_RATE_LIMITER: OnceCell<RateLimiter> = OnceCell::new();

impl RateLimiter {
    pub fn new(max_concurrent: usize) -> Self {
        RateLimiter {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.semaphore.acquire().await
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Limiter shared by every request to the SEC archive in this process.
    pub fn edgar() -> &'static RateLimiter {
        EDGAR_RATE_LIMITER.get_or_init(|| RateLimiter::new(EDGAR_MAX_CONCURRENT))
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(EDGAR_MAX_CONCURRENT)
    }
}
