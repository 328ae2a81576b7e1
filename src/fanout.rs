//! Fan-Out Module
//!
//! Runs independent lookups concurrently and collects their outcomes in input
//! order. A failing lookup only empties its own slot.

use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

// == Fan-Out Slot ==
/// Outcome of one lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanOutSlot<T> {
    pub value: Option<T>,
    pub succeeded: bool,
}

// == Fan-Out Result ==
/// Index-aligned outcomes of a [`fetch_all`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanOutResult<T> {
    slots: Vec<FanOutSlot<T>>,
    success_count: usize,
}

impl<T> FanOutResult<T> {
    pub fn slots(&self) -> &[FanOutSlot<T>] {
        &self.slots
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Consumes the result, yielding one `Option` per input item.
    pub fn into_values(self) -> Vec<Option<T>> {
        self.slots.into_iter().map(|slot| slot.value).collect()
    }
}

/// Runs `fetch` for every item concurrently.
///
/// `result.slots()[i]` always describes `items[i]`, whatever order the
/// lookups finish in. Errors are logged with their index and never cancel the
/// other lookups. An empty input returns immediately without calling `fetch`.
pub async fn fetch_all<D, T, E, F, Fut>(items: impl IntoIterator<Item = D>, fetch: F) -> FanOutResult<T>
where
    F: Fn(D) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let futures: Vec<Fut> = items.into_iter().map(&fetch).collect();
    if futures.is_empty() {
        return FanOutResult {
            slots: Vec::new(),
            success_count: 0,
        };
    }

    let total = futures.len();
    let slots: Vec<FanOutSlot<T>> = join_all(futures)
        .await
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| match outcome {
            Ok(value) => FanOutSlot {
                value: Some(value),
                succeeded: true,
            },
            Err(e) => {
                warn!("Fan-out item {} of {} failed: {}", index + 1, total, e);
                FanOutSlot {
                    value: None,
                    succeeded: false,
                }
            }
        })
        .collect();

    let success_count = slots.iter().filter(|slot| slot.succeeded).count();
    debug!("Fan-out complete: {} of {} succeeded", success_count, total);

    FanOutResult { slots, success_count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_failure_keeps_order_and_count() {
        let result = fetch_all(["a", "b", "c"], |item| async move {
            if item == "b" {
                Err(format!("{} failed", item))
            } else {
                Ok(item.to_uppercase())
            }
        })
        .await;

        assert_eq!(result.success_count(), 2);
        assert_eq!(result.slots()[1], FanOutSlot { value: None, succeeded: false });
        assert_eq!(
            result.into_values(),
            vec![Some("A".to_string()), None, Some("C".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_preserved_regardless_of_completion() {
        // Earlier items finish later
        let result = fetch_all(vec![30u64, 20, 10, 0], |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, String>(ms)
        })
        .await;

        assert_eq!(result.into_values(), vec![Some(30), Some(20), Some(10), Some(0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_run_concurrently() {
        let start = tokio::time::Instant::now();

        let result = fetch_all(0..5, |_| async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, String>(())
        })
        .await;

        assert_eq!(result.success_count(), 5);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_fetch() {
        let calls = AtomicUsize::new(0);

        let result = fetch_all(Vec::<u32>::new(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(()) }
        })
        .await;

        assert!(result.is_empty());
        assert_eq!(result.success_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_failures() {
        let result = fetch_all(1..=3, |n| async move { Err::<(), _>(format!("no {}", n)) }).await;

        assert_eq!(result.len(), 3);
        assert_eq!(result.success_count(), 0);
        assert!(result.slots().iter().all(|slot| !slot.succeeded));
    }
}
