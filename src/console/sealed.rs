//! Single-unwrap adapter
//!
//! The evaluation result type is exactly one layer of asynchronicity around
//! a plain value, and the driver must control how many layers are unwrapped.
//! `Sealed` is the arity-one wrapper that enforces this: the driver awaits
//! interpreter futures through it and nowhere else, so exactly one layer is
//! resolved regardless of what the resulting value itself wraps — never a
//! transitive unwrap by whatever awaits further up the stack.

use crate::evaluator::{EvalOutcome, PendingResult, ReleaseGuard};

/// Arity-one wrapper around a pending evaluation.
pub struct Sealed {
    slot: [PendingResult; 1],
}

impl Sealed {
    /// Seal a pending result for a single-layer await.
    pub fn new(pending: PendingResult) -> Self {
        Self { slot: [pending] }
    }

    /// Await exactly one layer and surrender the release guard.
    ///
    /// The guard must outlive rendering: the interpreter-side resource is
    /// freed when the caller releases it, or when the guard drops —
    /// whichever comes first, on every exit path.
    pub async fn open(self) -> (EvalOutcome, ReleaseGuard) {
        let [pending] = self.slot;
        let outcome = pending.future.await;
        (outcome, pending.guard)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::evaluator::Value;

    #[tokio::test]
    async fn test_open_resolves_one_layer() {
        let sealed = Sealed::new(PendingResult::ready(Ok(Value::Plain("2".to_string()))));
        let (outcome, _guard) = sealed.open().await;
        assert!(matches!(outcome, Ok(Value::Plain(repr)) if repr == "2"));
    }

    #[tokio::test]
    async fn test_guard_survives_until_dropped() {
        let released = Arc::new(AtomicUsize::new(0));
        let hook_released = released.clone();
        let pending = PendingResult::new(
            Box::pin(async { Ok(Value::None) }),
            ReleaseGuard::new(move || {
                hook_released.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let (outcome, guard) = Sealed::new(pending).open().await;
        assert!(matches!(outcome, Ok(Value::None)));
        assert_eq!(released.load(Ordering::SeqCst), 0);

        drop(guard);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
