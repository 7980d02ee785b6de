//! Worker pool: N long-lived worker threads over a bounded, optionally
//! prioritized task queue.
//!
//! Ordering is a stable priority queue: higher priority first, FIFO within
//! equal priority (tie-broken by submission sequence). `enqueue` fails
//! fast with typed errors when the queue is full or after shutdown. Tasks
//! whose deadline expires while queued fail with a timeout without
//! running; running tasks observe a deadline-aware context cooperatively.

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};

use vibecheck_core::config::PoolConfig;
use vibecheck_core::errors::PoolError;
use vibecheck_core::CancellationToken;

/// Deadline-aware context handed to every task body.
#[derive(Debug, Clone)]
pub struct TaskContext {
    cancel: CancellationToken,
    deadline: Instant,
}

impl TaskContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline_exceeded(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Suspension-point check: error out when cancelled or out of time.
    pub fn checkpoint(&self) -> Result<(), PoolError> {
        if self.is_cancelled() {
            return Err(PoolError::Cancelled);
        }
        if self.deadline_exceeded() {
            return Err(PoolError::Timeout { timeout_ms: 0 });
        }
        Ok(())
    }
}

enum ResultSink<O> {
    Single(Sender<Result<O, PoolError>>),
    Indexed(Sender<(usize, Result<O, PoolError>)>, usize),
}

impl<O> ResultSink<O> {
    fn deliver(self, result: Result<O, PoolError>) {
        match self {
            ResultSink::Single(tx) => {
                let _ = tx.send(result);
            }
            ResultSink::Indexed(tx, index) => {
                let _ = tx.send((index, result));
            }
        }
    }
}

struct PendingTask<I, O> {
    priority: i32,
    seq: u64,
    input: I,
    enqueued_at: Instant,
    timeout: Duration,
    sink: ResultSink<O>,
}

impl<I, O> PartialEq for PendingTask<I, O> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<I, O> Eq for PendingTask<I, O> {}

impl<I, O> PartialOrd for PendingTask<I, O> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<I, O> Ord for PendingTask<I, O> {
    // Max-heap: highest priority first, then lowest sequence number.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct QueueState<I, O> {
    heap: BinaryHeap<PendingTask<I, O>>,
    shutdown: bool,
    busy: usize,
}

struct Shared<I, O> {
    state: Mutex<QueueState<I, O>>,
    work_cv: Condvar,
    idle_cv: Condvar,
}

/// The pool. `I` and `O` are the task input and output; the processor runs
/// on worker threads and must check its [`TaskContext`] at suspension
/// points.
pub struct WorkerPool<I, O> {
    shared: Arc<Shared<I, O>>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
    priority_enabled: bool,
    default_timeout: Duration,
    seq: AtomicU64,
    cancel: CancellationToken,
}

/// Handle resolved with the task result or a typed failure.
pub struct TaskHandle<O> {
    rx: Receiver<Result<O, PoolError>>,
    deadline: Instant,
    timeout_ms: u64,
}

impl<O> TaskHandle<O> {
    /// Block until the result arrives or the task deadline passes.
    pub fn wait(self) -> Result<O, PoolError> {
        match self.rx.recv_deadline(self.deadline) {
            Ok(result) => result,
            Err(_) => Err(PoolError::Timeout {
                timeout_ms: self.timeout_ms,
            }),
        }
    }

    /// Non-blocking poll.
    pub fn try_wait(&self) -> Option<Result<O, PoolError>> {
        self.rx.try_recv().ok()
    }
}

impl<I: Send + 'static, O: Send + 'static> WorkerPool<I, O> {
    /// Spawn the worker threads.
    pub fn new<F>(config: &PoolConfig, processor: F) -> Self
    where
        F: Fn(I, &TaskContext) -> Result<O, PoolError> + Send + Sync + 'static,
    {
        Self::with_cancellation(config, CancellationToken::new(), processor)
    }

    /// Spawn with an externally owned cancellation token.
    pub fn with_cancellation<F>(
        config: &PoolConfig,
        cancel: CancellationToken,
        processor: F,
    ) -> Self
    where
        F: Fn(I, &TaskContext) -> Result<O, PoolError> + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                shutdown: false,
                busy: 0,
            }),
            work_cv: Condvar::new(),
            idle_cv: Condvar::new(),
        });
        let processor = Arc::new(processor);

        let workers = (0..config.effective_workers())
            .map(|_| {
                let shared = Arc::clone(&shared);
                let processor = Arc::clone(&processor);
                let cancel = cancel.clone();
                std::thread::spawn(move || worker_loop(shared, processor, cancel))
            })
            .collect();

        Self {
            shared,
            workers,
            capacity: config.effective_queue_capacity(),
            priority_enabled: config.effective_priority(),
            default_timeout: Duration::from_millis(config.effective_default_timeout_ms()),
            seq: AtomicU64::new(0),
            cancel,
        }
    }

    /// Submit with default priority and timeout.
    pub fn submit(&self, input: I) -> Result<TaskHandle<O>, PoolError> {
        self.submit_with(input, 0, None)
    }

    /// Submit with an explicit priority (higher runs first) and optional
    /// per-task timeout overriding the pool default.
    pub fn submit_with(
        &self,
        input: I,
        priority: i32,
        timeout: Option<Duration>,
    ) -> Result<TaskHandle<O>, PoolError> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let (tx, rx) = bounded(1);
        let deadline = Instant::now() + timeout;
        self.enqueue(input, priority, timeout, ResultSink::Single(tx))?;
        Ok(TaskHandle {
            rx,
            deadline,
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    /// Submit a batch; results arrive on the returned channel the moment
    /// each completes, tagged with the input's index (unordered).
    pub fn submit_stream(&self, inputs: Vec<I>) -> Receiver<(usize, Result<O, PoolError>)> {
        let (tx, rx) = bounded(inputs.len().max(1));
        for (index, input) in inputs.into_iter().enumerate() {
            let sink = ResultSink::Indexed(tx.clone(), index);
            if let Err(e) = self.enqueue(input, 0, self.default_timeout, sink) {
                let _ = tx.send((index, Err(e)));
            }
        }
        rx
    }

    fn enqueue(
        &self,
        input: I,
        priority: i32,
        timeout: Duration,
        sink: ResultSink<O>,
    ) -> Result<(), PoolError> {
        let priority = if self.priority_enabled { priority } else { 0 };
        let mut state = self.shared.state.lock().expect("pool lock");
        if state.shutdown {
            return Err(PoolError::ShutDown);
        }
        if state.heap.len() >= self.capacity {
            return Err(PoolError::QueueFull {
                capacity: self.capacity,
            });
        }
        state.heap.push(PendingTask {
            priority,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            input,
            enqueued_at: Instant::now(),
            timeout,
            sink,
        });
        drop(state);
        self.shared.work_cv.notify_one();
        Ok(())
    }

    /// Block until the queue is empty and no worker slot is busy.
    pub fn drain(&self) {
        let mut state = self.shared.state.lock().expect("pool lock");
        while !(state.heap.is_empty() && state.busy == 0) {
            state = self.shared.idle_cv.wait(state).expect("pool lock");
        }
    }

    /// Reject every pending task with `Cancelled`.
    pub fn clear_queue(&self) -> usize {
        let drained: Vec<PendingTask<I, O>> = {
            let mut state = self.shared.state.lock().expect("pool lock");
            state.heap.drain().collect()
        };
        let count = drained.len();
        for task in drained {
            task.sink.deliver(Err(PoolError::Cancelled));
        }
        self.shared.idle_cv.notify_all();
        count
    }

    /// Signal cooperative cancellation: pending tasks reject, in-flight
    /// tasks observe the token at their next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.clear_queue();
    }

    /// Number of pending (not yet running) tasks.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().expect("pool lock").heap.len()
    }

    /// Number of busy worker slots.
    pub fn busy(&self) -> usize {
        self.shared.state.lock().expect("pool lock").busy
    }

    /// Flag shutdown (subsequent enqueues fail), finish queued work, and
    /// join the worker threads.
    pub fn shutdown(mut self) {
        {
            let mut state = self.shared.state.lock().expect("pool lock");
            state.shutdown = true;
        }
        self.shared.work_cv.notify_all();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        self.shared.idle_cv.notify_all();
    }
}

fn worker_loop<I, O, F>(shared: Arc<Shared<I, O>>, processor: Arc<F>, cancel: CancellationToken)
where
    F: Fn(I, &TaskContext) -> Result<O, PoolError>,
{
    loop {
        let task = {
            let mut state = shared.state.lock().expect("pool lock");
            loop {
                if let Some(task) = state.heap.pop() {
                    state.busy += 1;
                    break task;
                }
                if state.shutdown {
                    return;
                }
                state = shared.work_cv.wait(state).expect("pool lock");
            }
        };

        let deadline = task.enqueued_at + task.timeout;
        let timeout_ms = task.timeout.as_millis() as u64;
        let result = if cancel.is_cancelled() {
            Err(PoolError::Cancelled)
        } else if Instant::now() >= deadline {
            // Expired while queued; never runs.
            Err(PoolError::Timeout { timeout_ms })
        } else {
            let ctx = TaskContext {
                cancel: cancel.clone(),
                deadline,
            };
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                processor(task.input, &ctx)
            }));
            match outcome {
                Ok(Ok(value)) => {
                    if Instant::now() >= deadline {
                        Err(PoolError::Timeout { timeout_ms })
                    } else {
                        Ok(value)
                    }
                }
                Ok(Err(PoolError::Timeout { .. })) => Err(PoolError::Timeout { timeout_ms }),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(PoolError::Failed {
                    message: "task panicked".to_string(),
                }),
            }
        };

        task.sink.deliver(result);

        let mut state = shared.state.lock().expect("pool lock");
        state.busy -= 1;
        if state.heap.is_empty() && state.busy == 0 {
            shared.idle_cv.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(workers: usize, capacity: usize, priority: bool) -> PoolConfig {
        PoolConfig {
            workers: Some(workers),
            queue_capacity: Some(capacity),
            priority: Some(priority),
            default_timeout_ms: Some(5_000),
        }
    }

    #[test]
    fn results_round_trip() {
        let pool = WorkerPool::new(&config(2, 100, false), |n: u32, _ctx| Ok(n * 2));
        let handle = pool.submit(21).unwrap();
        assert_eq!(handle.wait(), Ok(42));
        pool.shutdown();
    }

    #[test]
    fn queue_full_fails_fast() {
        // One worker blocked on a slow task, capacity 1.
        let pool = WorkerPool::new(&config(1, 1, false), |n: u32, _ctx| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(n)
        });
        let first = pool.submit(1).unwrap();
        // Wait for the worker to pick up the first task.
        while pool.busy() == 0 {
            std::thread::yield_now();
        }
        let _second = pool.submit(2).unwrap();
        let third = pool.submit(3);
        assert!(matches!(third, Err(PoolError::QueueFull { capacity: 1 })));
        assert_eq!(first.wait(), Ok(1));
        pool.shutdown();
    }

    #[test]
    fn shutdown_rejects_new_work_but_finishes_queued() {
        let pool = WorkerPool::new(&config(1, 100, false), |n: u32, _ctx| Ok(n + 1));
        let handle = pool.submit(1).unwrap();
        {
            let mut state = pool.shared.state.lock().unwrap();
            state.shutdown = true;
        }
        pool.shared.work_cv.notify_all();
        assert!(matches!(pool.submit(2), Err(PoolError::ShutDown)));
        assert_eq!(handle.wait(), Ok(2));
        pool.shutdown();
    }

    #[test]
    fn priority_is_stable_within_equal_priority() {
        // Single worker; block it so the queue orders the rest.
        let (gate_tx, gate_rx) = bounded::<()>(0);
        let order = Arc::new(Mutex::new(Vec::new()));
        let order_clone = Arc::clone(&order);
        let pool = WorkerPool::with_cancellation(
            &config(1, 100, true),
            CancellationToken::new(),
            move |n: u32, _ctx| {
                if n == 0 {
                    let _ = gate_rx.recv();
                } else {
                    order_clone.lock().unwrap().push(n);
                }
                Ok(n)
            },
        );
        let _blocker = pool.submit_with(0, 100, None).unwrap();
        while pool.busy() == 0 {
            std::thread::yield_now();
        }
        let handles: Vec<_> = [
            (1, 0),
            (2, 5),
            (3, 0),
            (4, 5),
            (5, 0),
        ]
        .iter()
        .map(|&(n, prio)| pool.submit_with(n, prio, None).unwrap())
        .collect();
        gate_tx.send(()).unwrap();
        for handle in handles {
            handle.wait().unwrap();
        }
        // Priority 5 tasks first in submission order, then priority 0.
        assert_eq!(*order.lock().unwrap(), vec![2, 4, 1, 3, 5]);
        pool.shutdown();
    }

    #[test]
    fn per_task_timeout_releases_the_slot() {
        let pool = WorkerPool::new(&config(1, 100, false), |n: u32, ctx| {
            if n == 0 {
                while !ctx.deadline_exceeded() {
                    std::thread::sleep(Duration::from_millis(5));
                }
                ctx.checkpoint()?;
            }
            Ok(n)
        });
        let slow = pool
            .submit_with(0, 0, Some(Duration::from_millis(50)))
            .unwrap();
        assert!(matches!(slow.wait(), Err(PoolError::Timeout { .. })));
        // The slot is released and serves the next task.
        let fast = pool.submit(7).unwrap();
        assert_eq!(fast.wait(), Ok(7));
        pool.shutdown();
    }

    #[test]
    fn clear_queue_rejects_pending_with_cancelled() {
        let (gate_tx, gate_rx) = bounded::<()>(0);
        let pool = WorkerPool::new(&config(1, 100, false), move |n: u32, _ctx| {
            if n == 0 {
                let _ = gate_rx.recv();
            }
            Ok(n)
        });
        let blocker = pool.submit(0).unwrap();
        while pool.busy() == 0 {
            std::thread::yield_now();
        }
        let pending = pool.submit(1).unwrap();
        assert_eq!(pool.clear_queue(), 1);
        assert_eq!(pending.wait(), Err(PoolError::Cancelled));
        gate_tx.send(()).unwrap();
        blocker.wait().unwrap();
        pool.shutdown();
    }

    #[test]
    fn stream_results_are_index_tagged() {
        let pool = WorkerPool::new(&config(4, 100, false), |n: u32, _ctx| Ok(n * 10));
        let rx = pool.submit_stream(vec![1, 2, 3, 4, 5]);
        let mut results: Vec<(usize, u32)> = rx
            .iter()
            .take(5)
            .map(|(i, r)| (i, r.unwrap()))
            .collect();
        results.sort();
        assert_eq!(
            results,
            vec![(0, 10), (1, 20), (2, 30), (3, 40), (4, 50)]
        );
        pool.shutdown();
    }

    #[test]
    fn drain_blocks_until_idle() {
        let pool = WorkerPool::new(&config(2, 100, false), |n: u32, _ctx| {
            std::thread::sleep(Duration::from_millis(20));
            Ok(n)
        });
        let handles: Vec<_> = (0..6).map(|n| pool.submit(n).unwrap()).collect();
        pool.drain();
        assert_eq!(pool.pending(), 0);
        assert_eq!(pool.busy(), 0);
        for handle in handles {
            assert!(handle.try_wait().is_some());
        }
        pool.shutdown();
    }
}
