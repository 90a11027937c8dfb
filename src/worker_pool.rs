use futures::stream::{self, StreamExt};
use std::future::Future;
use thiserror::Error;

/// Batch-level failure. Individual task errors are reported per slot and
/// never surface here.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The batch contained nothing to schedule
    #[error("batch contains no requests")]
    EmptyBatch,
}

/// Runs one task per input with at most `max_concurrency` in flight.
///
/// Returns one `Result` slot per input, in input order, regardless of the
/// order in which tasks complete. The call resolves only after every task
/// has resolved; no partial results are observable mid-flight. A failing
/// task fills its own slot and never aborts its siblings.
///
/// # Errors
///
/// [`BatchError::EmptyBatch`] if `inputs` is empty — the only condition
/// under which the batch itself cannot be scheduled.
pub async fn run_batch<I, T, E, F, Fut>(
    inputs: Vec<I>,
    max_concurrency: usize,
    task: F,
) -> Result<Vec<Result<T, E>>, BatchError>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if inputs.is_empty() {
        return Err(BatchError::EmptyBatch);
    }

    let mut slots: Vec<(usize, Result<T, E>)> = stream::iter(inputs.into_iter().enumerate())
        .map(|(index, input)| {
            let fut = task(input);
            async move { (index, fut.await) }
        })
        .buffer_unordered(max_concurrency.max(1))
        .collect()
        .await;

    // Completion order is arbitrary; realign to input order
    slots.sort_by_key(|(index, _)| *index);

    Ok(slots.into_iter().map(|(_, result)| result).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_batch_is_an_error() {
        let result = run_batch(Vec::<u32>::new(), 5, |n| async move { Ok::<_, &str>(n) }).await;
        assert!(matches!(result, Err(BatchError::EmptyBatch)));
    }

    #[tokio::test]
    async fn test_results_stay_index_aligned_under_reversed_completion() {
        // Delays force tasks to complete in reverse input order
        let inputs: Vec<u64> = vec![60, 40, 20];

        let results = run_batch(inputs, 3, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<u64, &str>(delay)
        })
        .await
        .unwrap();

        let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![60, 40, 20]);
    }

    #[tokio::test]
    async fn test_failing_task_fills_its_slot_only() {
        let results = run_batch(vec![1, 2, 3], 2, |n| async move {
            if n == 2 {
                Err("boom")
            } else {
                Ok(n)
            }
        })
        .await
        .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Ok(1));
        assert_eq!(results[1], Err("boom"));
        assert_eq!(results[2], Ok(3));
    }

    #[tokio::test]
    async fn test_respects_concurrency_cap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let inputs: Vec<usize> = (0..20).collect();

        let results = run_batch(inputs, 3, |_| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, Infallible>(())
            }
        })
        .await
        .unwrap();

        assert_eq!(results.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_makes_progress() {
        let results = run_batch(vec![1, 2], 0, |n| async move { Ok::<_, &str>(n * 10) })
            .await
            .unwrap();

        assert_eq!(results, vec![Ok(10), Ok(20)]);
    }
}
