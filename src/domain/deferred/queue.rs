//! Named FIFO queues of deferred operations.
//!
//! An operation captured here owns its arguments (moved into the closure at
//! call time) and is consumed exactly once: it is removed from the front of
//! its queue before it runs, so a nested drain can never see it again.

use futures::future::{BoxFuture, FutureExt};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Name of a deferred queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueName(Cow<'static, str>);

impl QueueName {
    /// Queue drained when a session is established.
    pub const LOGIN: QueueName = QueueName(Cow::Borrowed("login"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type DeferredCall<C> = Box<dyn FnOnce(C) -> BoxFuture<'static, ()> + Send>;

/// A suspended operation together with everything it needs to run.
pub struct DeferredOperation<C> {
    label: &'static str,
    call: DeferredCall<C>,
}

impl<C> DeferredOperation<C> {
    /// Captures `call`; it receives the drain context when replayed.
    pub fn new<F, Fut>(label: &'static str, call: F) -> Self
    where
        F: FnOnce(C) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            label,
            call: Box::new(move |ctx| call(ctx).boxed()),
        }
    }

    /// Operation name, for logs.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Consumes the entry and runs it.
    pub async fn run(self, ctx: C) {
        (self.call)(ctx).await
    }
}

impl<C> fmt::Debug for DeferredOperation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredOperation")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Result of a drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainSummary {
    pub queue: QueueName,
    pub replayed: usize,
    /// True if the queue was already draining and this call did nothing.
    pub already_draining: bool,
}

/// Per-name FIFO queues of deferred operations.
///
/// Queues are created on first enqueue and removed once drained empty.
pub struct DeferredQueue<C> {
    queues: Mutex<HashMap<QueueName, VecDeque<DeferredOperation<C>>>>,
    draining: Mutex<HashSet<QueueName>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C> DeferredQueue<C> {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            draining: Mutex::new(HashSet::new()),
        }
    }

    /// Appends an operation to the back of `queue`. Returns the new length.
    pub fn enqueue(&self, queue: QueueName, operation: DeferredOperation<C>) -> usize {
        let mut queues = lock(&self.queues);
        let entries = queues.entry(queue).or_default();
        entries.push_back(operation);
        entries.len()
    }

    /// Appends `operation` only if `queue` still has work ahead of it: it is
    /// being drained or holds entries. Otherwise hands the operation back.
    ///
    /// A drain that observes its queue empty releases it under the same
    /// lock, so an accepted operation is always replayed by that drain or a
    /// later one.
    pub fn enqueue_if_pending(
        &self,
        queue: &QueueName,
        operation: DeferredOperation<C>,
    ) -> Result<usize, DeferredOperation<C>> {
        let mut queues = lock(&self.queues);
        let busy = queues.contains_key(queue) || lock(&self.draining).contains(queue);
        if !busy {
            return Err(operation);
        }
        let entries = queues.entry(queue.clone()).or_default();
        entries.push_back(operation);
        Ok(entries.len())
    }

    /// True while a drain of `queue` is running.
    pub fn is_draining(&self, queue: &QueueName) -> bool {
        lock(&self.draining).contains(queue)
    }

    /// True if `queue` exists, i.e. holds at least one pending operation.
    pub fn has(&self, queue: &QueueName) -> bool {
        lock(&self.queues).contains_key(queue)
    }

    /// Number of pending operations in `queue`.
    pub fn len(&self, queue: &QueueName) -> usize {
        lock(&self.queues).get(queue).map_or(0, VecDeque::len)
    }

    /// Number of pending operations across all queues.
    pub fn pending_total(&self) -> usize {
        lock(&self.queues).values().map(VecDeque::len).sum()
    }

    /// Drops every pending operation in `queue`. Returns how many were dropped.
    pub fn clear(&self, queue: &QueueName) -> usize {
        lock(&self.queues).remove(queue).map_or(0, |entries| entries.len())
    }

    /// Drops every pending operation in every queue.
    pub fn clear_all(&self) -> usize {
        let drained: Vec<_> = lock(&self.queues).drain().collect();
        drained.iter().map(|(_, entries)| entries.len()).sum()
    }

    /// Takes the next entry, or releases the drain if there is none. Both
    /// happen under the queues lock.
    fn next_or_release(
        &self,
        queue: &QueueName,
        guard: &mut DrainGuard<'_>,
    ) -> Option<DeferredOperation<C>> {
        let mut queues = lock(&self.queues);
        let next = queues.get_mut(queue).and_then(VecDeque::pop_front);
        if queues.get(queue).is_some_and(VecDeque::is_empty) {
            queues.remove(queue);
        }
        if next.is_none() {
            guard.release();
        }
        next
    }
}

impl<C: Clone + Send> DeferredQueue<C> {
    /// Replays `queue` front to back, awaiting each operation in turn.
    ///
    /// Operations enqueued onto other queues while draining stay there. A
    /// drain of a queue that is already draining returns immediately.
    /// Draining an absent queue completes with zero replayed entries.
    pub async fn drain(&self, queue: &QueueName, ctx: C) -> DrainSummary {
        let Some(mut guard) = DrainGuard::acquire(&self.draining, queue) else {
            tracing::debug!(queue = %queue, "Queue already draining, skipping nested drain");
            return DrainSummary {
                queue: queue.clone(),
                replayed: 0,
                already_draining: true,
            };
        };

        let mut replayed = 0;
        while let Some(operation) = self.next_or_release(queue, &mut guard) {
            tracing::debug!(
                queue = %queue,
                operation = operation.label(),
                "Replaying deferred operation"
            );
            operation.run(ctx.clone()).await;
            replayed += 1;
        }

        DrainSummary {
            queue: queue.clone(),
            replayed,
            already_draining: false,
        }
    }
}

impl<C> Default for DeferredQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a queue as draining until released or dropped.
struct DrainGuard<'a> {
    draining: &'a Mutex<HashSet<QueueName>>,
    queue: QueueName,
    released: bool,
}

impl<'a> DrainGuard<'a> {
    fn acquire(draining: &'a Mutex<HashSet<QueueName>>, queue: &QueueName) -> Option<Self> {
        if !lock(draining).insert(queue.clone()) {
            return None;
        }
        Some(Self {
            draining,
            queue: queue.clone(),
            released: false,
        })
    }

    fn release(&mut self) {
        if !self.released {
            lock(self.draining).remove(&self.queue);
            self.released = true;
        }
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct Harness {
        queue: DeferredQueue<Arc<Harness>>,
        log: Mutex<Vec<String>>,
    }

    impl Harness {
        fn record(&self, entry: impl Into<String>) {
            self.log.lock().unwrap().push(entry.into());
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        fn defer_record(&self, queue: QueueName, entry: &str) {
            let entry = entry.to_string();
            self.queue.enqueue(
                queue,
                DeferredOperation::new("record", move |h: Arc<Harness>| async move {
                    h.record(entry);
                }),
            );
        }
    }

    #[test]
    fn queues_are_created_lazily() {
        let harness = Harness::default();
        assert!(!harness.queue.has(&QueueName::LOGIN));

        harness.defer_record(QueueName::LOGIN, "a");

        assert!(harness.queue.has(&QueueName::LOGIN));
        assert_eq!(harness.queue.len(&QueueName::LOGIN), 1);
        assert!(!harness.queue.has(&QueueName::new("trade")));
    }

    #[test]
    fn drain_replays_in_enqueue_order_and_empties_queue() {
        let harness = Arc::new(Harness::default());
        for entry in ["first", "second", "third"] {
            harness.defer_record(QueueName::LOGIN, entry);
        }

        let summary = block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

        assert_eq!(summary.replayed, 3);
        assert!(!summary.already_draining);
        assert_eq!(harness.log(), vec!["first", "second", "third"]);
        assert!(!harness.queue.has(&QueueName::LOGIN));
    }

    #[test]
    fn draining_empty_queue_is_a_no_op() {
        let harness = Arc::new(Harness::default());

        let summary = block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

        assert_eq!(summary.replayed, 0);
        assert!(!summary.already_draining);
        assert!(harness.log().is_empty());
    }

    #[test]
    fn drain_only_touches_the_named_queue() {
        let harness = Arc::new(Harness::default());
        harness.defer_record(QueueName::LOGIN, "login");
        harness.defer_record(QueueName::new("trade"), "trade");

        block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

        assert_eq!(harness.log(), vec!["login"]);
        assert_eq!(harness.queue.len(&QueueName::new("trade")), 1);
    }

    #[test]
    fn operations_may_enqueue_onto_other_queues_mid_drain() {
        let harness = Arc::new(Harness::default());
        harness.queue.enqueue(
            QueueName::LOGIN,
            DeferredOperation::new("chain", |h: Arc<Harness>| async move {
                h.record("chain");
                h.defer_record(QueueName::new("later"), "later");
            }),
        );
        harness.defer_record(QueueName::LOGIN, "after-chain");

        let summary = block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

        assert_eq!(summary.replayed, 2);
        assert_eq!(harness.log(), vec!["chain", "after-chain"]);
        assert!(harness.queue.has(&QueueName::new("later")));
    }

    #[test]
    fn nested_drain_of_same_queue_exits_harmlessly() {
        let harness = Arc::new(Harness::default());
        harness.queue.enqueue(
            QueueName::LOGIN,
            DeferredOperation::new("nested", |h: Arc<Harness>| async move {
                let nested = h.queue.drain(&QueueName::LOGIN, h.clone()).await;
                h.record(format!("nested already_draining={}", nested.already_draining));
            }),
        );
        harness.defer_record(QueueName::LOGIN, "tail");

        let summary = block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

        assert_eq!(summary.replayed, 2);
        assert_eq!(
            harness.log(),
            vec!["nested already_draining=true", "tail"]
        );
    }

    #[test]
    fn late_arrivals_join_a_running_drain() {
        let harness = Arc::new(Harness::default());
        harness.queue.enqueue(
            QueueName::LOGIN,
            DeferredOperation::new("first", |h: Arc<Harness>| async move {
                h.record("first");
                assert!(h.queue.is_draining(&QueueName::LOGIN));
                let late = DeferredOperation::new("late", |h: Arc<Harness>| async move {
                    h.record("late");
                });
                assert!(h.queue.enqueue_if_pending(&QueueName::LOGIN, late).is_ok());
            }),
        );
        harness.defer_record(QueueName::LOGIN, "second");

        let summary = block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

        assert_eq!(summary.replayed, 3);
        assert_eq!(harness.log(), vec!["first", "second", "late"]);
        assert!(!harness.queue.is_draining(&QueueName::LOGIN));
    }

    #[test]
    fn idle_empty_queue_hands_operation_back() {
        let harness = Harness::default();
        let op = DeferredOperation::new("idle", |h: Arc<Harness>| async move {
            h.record("idle");
        });

        let rejected = harness.queue.enqueue_if_pending(&QueueName::LOGIN, op);

        assert_eq!(rejected.map_err(|op| op.label()).unwrap_err(), "idle");
        assert!(!harness.queue.has(&QueueName::LOGIN));

        harness.defer_record(QueueName::LOGIN, "waiting");
        let op = DeferredOperation::new("behind", |_: Arc<Harness>| async {});
        assert_eq!(harness.queue.enqueue_if_pending(&QueueName::LOGIN, op).ok(), Some(2));
    }

    #[test]
    fn queue_can_be_drained_again_after_completion() {
        let harness = Arc::new(Harness::default());
        harness.defer_record(QueueName::LOGIN, "one");
        block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

        harness.defer_record(QueueName::LOGIN, "two");
        let summary = block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

        assert_eq!(summary.replayed, 1);
        assert_eq!(harness.log(), vec!["one", "two"]);
    }

    #[test]
    fn clear_drops_entries_without_running_them() {
        let harness = Arc::new(Harness::default());
        harness.defer_record(QueueName::LOGIN, "a");
        harness.defer_record(QueueName::LOGIN, "b");
        harness.defer_record(QueueName::new("trade"), "c");

        assert_eq!(harness.queue.pending_total(), 3);
        assert_eq!(harness.queue.clear(&QueueName::LOGIN), 2);
        assert_eq!(harness.queue.clear_all(), 1);
        assert_eq!(harness.queue.pending_total(), 0);

        block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));
        assert!(harness.log().is_empty());
    }

    #[test]
    fn captured_arguments_are_not_affected_by_later_calls() {
        let harness = Arc::new(Harness::default());
        let mut name = String::from("Alice");
        harness.defer_record(QueueName::LOGIN, &name);
        name.push_str("-changed");
        harness.defer_record(QueueName::LOGIN, &name);

        block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

        assert_eq!(harness.log(), vec!["Alice", "Alice-changed"]);
    }

    proptest! {
        #[test]
        fn replay_preserves_issue_order(entries in proptest::collection::vec("[a-z]{1,8}", 0..40)) {
            let harness = Arc::new(Harness::default());
            for entry in &entries {
                harness.defer_record(QueueName::LOGIN, entry);
            }

            let summary = block_on(harness.queue.drain(&QueueName::LOGIN, harness.clone()));

            prop_assert_eq!(summary.replayed, entries.len());
            prop_assert_eq!(harness.log(), entries);
        }
    }
}
