use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed pause between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Runs `action` until it succeeds or the attempts run out, handing every
    /// failure to `on_failure`. Returns `None` on exhaustion.
    pub async fn run<T, E, A, AFut, F, FFut>(&self, mut action: A, mut on_failure: F) -> Option<T>
    where
        A: FnMut(u32) -> AFut,
        AFut: Future<Output = Result<T, E>>,
        F: FnMut(u32, E) -> FFut,
        FFut: Future<Output = ()>,
    {
        for attempt in 1..=self.max_attempts {
            match action(attempt).await {
                Ok(value) => return Some(value),
                Err(e) => {
                    on_failure(attempt, e).await;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_failures() {
        let attempts = Cell::new(0);
        let failures = RefCell::new(vec![]);
        let started = Instant::now();

        let result = RetryPolicy::default()
            .run(
                |attempt| {
                    attempts.set(attempt);
                    async move {
                        if attempt < 3 {
                            Err(format!("boom {}", attempt))
                        } else {
                            Ok(attempt * 10)
                        }
                    }
                },
                |attempt, e| {
                    failures.borrow_mut().push((attempt, e));
                    async {}
                },
            )
            .await;

        assert_eq!(result, Some(30));
        assert_eq!(attempts.get(), 3);
        assert_eq!(
            *failures.borrow(),
            vec![(1, "boom 1".to_owned()), (2, "boom 2".to_owned())]
        );
        assert!(started.elapsed() >= Duration::from_secs(4));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let attempts = Cell::new(0);
        let failures = Cell::new(0);
        let started = Instant::now();

        let result: Option<()> = RetryPolicy::default()
            .run(
                |_| {
                    attempts.set(attempts.get() + 1);
                    async { Err("down") }
                },
                |_, _| {
                    failures.set(failures.get() + 1);
                    async {}
                },
            )
            .await;

        assert_eq!(result, None);
        assert_eq!(attempts.get(), 3);
        assert_eq!(failures.get(), 3);
        assert!(started.elapsed() >= Duration::from_secs(4));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn first_success_stops() {
        let attempts = Cell::new(0);
        let result = RetryPolicy {
            max_attempts: 5,
            backoff: Duration::ZERO,
        }
        .run(
            |_| {
                attempts.set(attempts.get() + 1);
                async { Ok::<_, ()>("sent") }
            },
            |_, _| async {},
        )
        .await;
        assert_eq!(result, Some("sent"));
        assert_eq!(attempts.get(), 1);
    }
}
