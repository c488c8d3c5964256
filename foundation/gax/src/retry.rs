use std::future::Future;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::select;
use tokio_util::sync::CancellationToken;

/// Delay strategy for retries. All variants are pure in the attempt number;
/// the random variants draw from the thread RNG on every evaluation.
#[derive(Clone, Debug)]
pub enum Strategy {
    /// Fixed delay between attempts.
    Fixed(u64),
    /// `attempt * base`.
    Linear(u64),
    /// `base * 2^attempt`.
    Exponential(u64),
    /// `random(0..max-1) + attempt`.
    Jitter(u64),
    /// Uniform in `[min, max]`.
    Random(u64, u64),
    /// `min(base * 2^attempt, cap)`.
    Backoff { base: u64, cap: u64 },
    /// Sum of the component delays.
    Combine(Vec<Strategy>),
    /// Maximum of the component delays.
    Compose(Vec<Strategy>),
}

impl Strategy {
    pub fn fixed(millis: u64) -> Self {
        Strategy::Fixed(millis)
    }

    pub fn linear(base: u64) -> Self {
        Strategy::Linear(base)
    }

    pub fn exponential(base: u64) -> Self {
        Strategy::Exponential(base)
    }

    pub fn jitter(max: u64) -> Self {
        Strategy::Jitter(max)
    }

    pub fn random(min: u64, max: u64) -> Self {
        Strategy::Random(min, max)
    }

    pub fn backoff(base: u64, cap: u64) -> Self {
        Strategy::Backoff { base, cap }
    }

    pub fn combine(strategies: Vec<Strategy>) -> Self {
        Strategy::Combine(strategies)
    }

    pub fn compose(strategies: Vec<Strategy>) -> Self {
        Strategy::Compose(strategies)
    }

    pub fn delay(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.millis(attempt))
    }

    fn millis(&self, attempt: usize) -> u64 {
        let attempt_u64 = attempt as u64;
        match self {
            Strategy::Fixed(d) => *d,
            Strategy::Linear(base) => base.saturating_mul(attempt_u64),
            Strategy::Exponential(base) => base.saturating_mul(pow2(attempt)),
            Strategy::Jitter(max) => {
                let jittered = if *max == 0 {
                    0
                } else {
                    rand::thread_rng().gen_range(0..*max)
                };
                jittered.saturating_add(attempt_u64)
            }
            Strategy::Random(min, max) => {
                if min >= max {
                    *min
                } else {
                    rand::thread_rng().gen_range(*min..=*max)
                }
            }
            Strategy::Backoff { base, cap } => base.saturating_mul(pow2(attempt)).min(*cap),
            Strategy::Combine(strategies) => strategies
                .iter()
                .fold(0u64, |acc, s| acc.saturating_add(s.millis(attempt))),
            Strategy::Compose(strategies) => {
                strategies.iter().map(|s| s.millis(attempt)).max().unwrap_or(0)
            }
        }
    }
}

fn pow2(attempt: usize) -> u64 {
    2u64.saturating_pow(attempt.min(u32::MAX as usize) as u32)
}

/// Extracts a typed view of an error.
pub trait TryAs<T> {
    fn try_as(&self) -> Option<&T>;
}

impl TryAs<tonic::Status> for tonic::Status {
    fn try_as(&self) -> Option<&tonic::Status> {
        Some(self)
    }
}

/// Hooks the retry loop needs from the error type.
pub trait Abort: Sized {
    /// Cancellation and client deadline errors are rethrown unconditionally,
    /// regardless of the configured predicate.
    fn never_retry(&self) -> bool;

    /// Error returned when the external token fires mid-loop.
    fn cancelled() -> Self;
}

/// Per-error delay selection used when no explicit strategy is configured.
pub trait DefaultDelay {
    fn default_strategy(&self) -> Strategy;
}

pub type Predicate<E> = Box<dyn Fn(&E, bool) -> bool + Send + Sync>;
pub type OnRetry<E> = Box<dyn Fn(usize, &E) + Send + Sync>;

pub struct RetrySetting<E> {
    /// Decides retryability from the error and the idempotent hint.
    pub predicate: Predicate<E>,
    /// Maximum number of attempts in total. `budget <= 1` performs a single
    /// attempt and rethrows its error.
    pub budget: usize,
    /// `None` asks the error for its default strategy per attempt.
    pub strategy: Option<Strategy>,
    pub idempotent: bool,
    pub on_retry: Option<OnRetry<E>>,
}

impl<E> RetrySetting<E> {
    pub fn new(predicate: Predicate<E>) -> Self {
        Self {
            predicate,
            budget: 10,
            strategy: None,
            idempotent: false,
            on_retry: None,
        }
    }
}

/// Runs `f` until it succeeds, the predicate declines, or the budget is
/// exhausted. Each attempt receives a child token of the external one so that
/// in-flight work is cancelled together with the loop.
pub async fn invoke<R, E, F, Fut>(
    cancel: Option<CancellationToken>,
    setting: RetrySetting<E>,
    mut f: F,
) -> Result<R, E>
where
    E: Abort + DefaultDelay,
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let external = cancel.unwrap_or_default();
    let fn_loop = async {
        let mut attempt: usize = 0;
        loop {
            let started = Instant::now();
            let err = match f(external.child_token()).await {
                Ok(v) => return Ok(v),
                Err(e) => e,
            };
            attempt += 1;
            if err.never_retry()
                || attempt >= setting.budget
                || !(setting.predicate)(&err, setting.idempotent)
            {
                return Err(err);
            }
            let strategy = match &setting.strategy {
                Some(s) => s.clone(),
                None => err.default_strategy(),
            };
            // the attempt itself counts against the delay
            let delay = strategy.delay(attempt).saturating_sub(started.elapsed());
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Some(on_retry) = &setting.on_retry {
                on_retry(attempt, &err);
            }
            tracing::trace!(attempt, "retrying after error");
        }
    };
    select! {
        biased;
        _ = external.cancelled() => Err(E::cancelled()),
        v = fn_loop => v,
    }
}

/// Like [`invoke`] but threads a reusable value through the attempts.
pub async fn invoke_reuse<R, E, V, F, Fut>(
    cancel: Option<CancellationToken>,
    setting: RetrySetting<E>,
    mut f: F,
    mut v: V,
) -> Result<R, E>
where
    E: Abort + DefaultDelay,
    F: FnMut(V, CancellationToken) -> Fut,
    Fut: Future<Output = Result<R, (E, V)>>,
{
    let external = cancel.unwrap_or_default();
    let fn_loop = async {
        let mut attempt: usize = 0;
        loop {
            let started = Instant::now();
            let err = match f(v, external.child_token()).await {
                Ok(r) => return Ok(r),
                Err((e, reusable)) => {
                    v = reusable;
                    e
                }
            };
            attempt += 1;
            if err.never_retry()
                || attempt >= setting.budget
                || !(setting.predicate)(&err, setting.idempotent)
            {
                return Err(err);
            }
            let strategy = match &setting.strategy {
                Some(s) => s.clone(),
                None => err.default_strategy(),
            };
            let delay = strategy.delay(attempt).saturating_sub(started.elapsed());
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Some(on_retry) = &setting.on_retry {
                on_retry(attempt, &err);
            }
        }
    };
    select! {
        biased;
        _ = external.cancelled() => Err(E::cancelled()),
        v = fn_loop => v,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Fatal,
        Cancelled,
    }

    impl Abort for TestError {
        fn never_retry(&self) -> bool {
            matches!(self, TestError::Cancelled)
        }

        fn cancelled() -> Self {
            TestError::Cancelled
        }
    }

    impl DefaultDelay for TestError {
        fn default_strategy(&self) -> Strategy {
            Strategy::fixed(0)
        }
    }

    fn retry_transient() -> RetrySetting<TestError> {
        RetrySetting::new(Box::new(|e, _| matches!(e, TestError::Transient)))
    }

    #[test]
    fn test_fixed() {
        let s = Strategy::fixed(7);
        assert_eq!(s.delay(1), Duration::from_millis(7));
        assert_eq!(s.delay(9), Duration::from_millis(7));
    }

    #[test]
    fn test_linear() {
        let s = Strategy::linear(100);
        assert_eq!(s.delay(1), Duration::from_millis(100));
        assert_eq!(s.delay(3), Duration::from_millis(300));
    }

    #[test]
    fn test_exponential() {
        let s = Strategy::exponential(10);
        assert_eq!(s.delay(0), Duration::from_millis(10));
        assert_eq!(s.delay(1), Duration::from_millis(20));
        assert_eq!(s.delay(4), Duration::from_millis(160));
    }

    #[test]
    fn test_exponential_saturates() {
        let s = Strategy::exponential(u64::MAX / 2);
        assert_eq!(s.delay(10), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_jitter_bounds() {
        let s = Strategy::jitter(50);
        for attempt in 0..20 {
            let d = s.delay(attempt).as_millis() as u64;
            assert!(d >= attempt as u64);
            assert!(d < 50 + attempt as u64);
        }
    }

    #[test]
    fn test_random_bounds() {
        let s = Strategy::random(10, 20);
        for _ in 0..20 {
            let d = s.delay(1).as_millis() as u64;
            assert!((10..=20).contains(&d));
        }
    }

    #[test]
    fn test_backoff_caps() {
        let s = Strategy::backoff(100, 500);
        assert_eq!(s.delay(1), Duration::from_millis(200));
        assert_eq!(s.delay(2), Duration::from_millis(400));
        assert_eq!(s.delay(3), Duration::from_millis(500));
        assert_eq!(s.delay(10), Duration::from_millis(500));
    }

    #[test]
    fn test_combine_sums() {
        let s = Strategy::combine(vec![Strategy::fixed(10), Strategy::linear(5)]);
        assert_eq!(s.delay(2), Duration::from_millis(20));
    }

    #[test]
    fn test_compose_takes_max() {
        let s = Strategy::compose(vec![Strategy::fixed(10), Strategy::linear(5)]);
        assert_eq!(s.delay(1), Duration::from_millis(10));
        assert_eq!(s.delay(4), Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_retry_once_then_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let retries = Arc::new(AtomicUsize::new(0));
        let mut setting = retry_transient();
        setting.budget = 2;
        setting.strategy = Some(Strategy::fixed(0));
        let observed = Arc::clone(&retries);
        setting.on_retry = Some(Box::new(move |attempt, _| {
            assert_eq!(attempt, 1);
            observed.fetch_add(1, Ordering::SeqCst);
        }));

        let calls_in_op = Arc::clone(&calls);
        let result = invoke(None, setting, move |_| {
            let calls = Arc::clone(&calls_in_op);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(retries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_zero_invokes_once_and_rethrows() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut setting = retry_transient();
        setting.budget = 0;

        let calls_in_op = Arc::clone(&calls);
        let result: Result<(), _> = invoke(None, setting, move |_| {
            let calls = Arc::clone(&calls_in_op);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient)
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), TestError::Transient);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_op = Arc::clone(&calls);
        let result: Result<(), _> = invoke(None, retry_transient(), move |_| {
            let calls = Arc::clone(&calls_in_op);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), TestError::Fatal);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_the_loop() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), _> = invoke(Some(cancel), retry_transient(), move |_| async move {
            Err(TestError::Transient)
        })
        .await;
        assert_eq!(result.unwrap_err(), TestError::Cancelled);
    }

    #[tokio::test]
    async fn test_invoke_reuse_threads_value() {
        let mut setting = retry_transient();
        setting.budget = 3;
        setting.strategy = Some(Strategy::fixed(0));
        let result = invoke_reuse(
            None,
            setting,
            |v: usize, _| async move {
                if v < 2 {
                    Err((TestError::Transient, v + 1))
                } else {
                    Ok(v)
                }
            },
            0usize,
        )
        .await;
        assert_eq!(result.unwrap(), 2);
    }
}
