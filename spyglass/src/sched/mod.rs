//! Cooperative scheduling
//!
//! The console runs on one control thread; anything that must not block an
//! interaction (store notification passes, large flattening passes) is
//! deferred onto a [`TaskQueue`] the host loop drains once per turn. The
//! core only depends on the [`Scheduler`] capability, so tests and embedders
//! can substitute their own queue.
//!
//! Mutation stays synchronous; only its observers run deferred. A task
//! deferred from within a running task executes on a later turn, never the
//! current one.

use crate::inspect::{FlatNode, FlattenHandle, FlattenSession, StepOutcome, FLATTEN_BATCH_SIZE};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + 'static>;

/// The "run after the current interaction batch" primitive the core needs.
pub trait Scheduler {
    /// Queue `task` to run on a later turn of the host loop.
    fn defer(&self, task: Task);
}

/// FIFO task queue drained once per turn of the host loop.
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every task that was queued before this call, in order.
    ///
    /// The queue length is snapshotted first, so a task deferring further
    /// work schedules it for the next drain rather than extending this one.
    /// Returns the number of tasks run.
    pub fn drain(&self) -> usize {
        let pending = self.tasks.borrow().len();
        for _ in 0..pending {
            // Re-borrow per task: the running task may defer new work.
            let task = self.tasks.borrow_mut().pop_front();
            let Some(task) = task else { break };
            task();
        }
        pending
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl Scheduler for TaskQueue {
    fn defer(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

/// Run `session` to completion across scheduler turns, one batch of
/// [`FLATTEN_BATCH_SIZE`] nodes per turn, then hand the final node list to
/// `on_complete`.
///
/// Returns the session's [`FlattenHandle`]; cancelling it abandons the
/// remaining work and `on_complete` never runs.
pub fn drive_flatten<F>(
    scheduler: &Rc<dyn Scheduler>,
    session: FlattenSession,
    on_complete: F,
) -> FlattenHandle
where
    F: FnOnce(Vec<FlatNode>) + 'static,
{
    let handle = session.handle();
    schedule_step(scheduler, session, on_complete);
    handle
}

fn schedule_step<F>(scheduler: &Rc<dyn Scheduler>, mut session: FlattenSession, on_complete: F)
where
    F: FnOnce(Vec<FlatNode>) + 'static,
{
    let next_turn = Rc::clone(scheduler);
    scheduler.defer(Box::new(move || {
        match session.run_step(FLATTEN_BATCH_SIZE) {
            StepOutcome::Pending => schedule_step(&next_turn, session, on_complete),
            StepOutcome::Complete => on_complete(session.into_nodes()),
            StepOutcome::Cancelled => {}
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::{flatten, ExpansionState, FlattenOptions, Value};
    use std::cell::Cell;

    #[test]
    fn test_drain_runs_tasks_in_fifo_order() {
        let queue = TaskQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = Rc::clone(&order);
            queue.defer(Box::new(move || order.borrow_mut().push(i)));
        }
        assert_eq!(queue.drain(), 3);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_task_deferred_from_task_runs_next_turn() {
        let queue = Rc::new(TaskQueue::new());
        let ran = Rc::new(Cell::new(false));
        {
            let queue_inner = Rc::clone(&queue);
            let ran = Rc::clone(&ran);
            queue.defer(Box::new(move || {
                queue_inner.defer(Box::new(move || ran.set(true)));
            }));
        }
        assert_eq!(queue.drain(), 1);
        assert!(!ran.get(), "nested task must wait for the next turn");
        assert_eq!(queue.drain(), 1);
        assert!(ran.get());
    }

    #[test]
    fn test_driven_session_matches_one_shot_flatten() {
        let queue = Rc::new(TaskQueue::new());
        let scheduler: Rc<dyn Scheduler> = Rc::<TaskQueue>::clone(&queue);
        let wide = Value::array((0..150).map(|i| Value::number(f64::from(i))));
        let expansion = ExpansionState::new();
        let expected = flatten(&wide, &expansion, 5);

        let session = FlattenSession::new(&wide, &expansion, FlattenOptions::with_depth(5));
        let result = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&result);
        let _handle = drive_flatten(&scheduler, session, move |nodes| {
            *sink.borrow_mut() = Some(nodes);
        });

        // Drive the queue the way a host loop would, one turn per drain.
        let mut turns = 0;
        while !queue.is_idle() {
            queue.drain();
            turns += 1;
            assert!(turns < 100, "driver failed to finish");
        }

        assert!(turns > 1, "101 nodes should not fit in one batch");
        assert_eq!(result.borrow().as_deref(), Some(expected.as_slice()));
    }

    #[test]
    fn test_cancelled_session_never_completes() {
        let queue = Rc::new(TaskQueue::new());
        let scheduler: Rc<dyn Scheduler> = Rc::<TaskQueue>::clone(&queue);
        let wide = Value::array((0..150).map(|i| Value::number(f64::from(i))));
        let expansion = ExpansionState::new();

        let session = FlattenSession::new(&wide, &expansion, FlattenOptions::with_depth(5));
        let completed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&completed);
        let handle = drive_flatten(&scheduler, session, move |_| flag.set(true));

        queue.drain();
        handle.cancel();
        let mut turns = 0;
        while !queue.is_idle() {
            queue.drain();
            turns += 1;
            assert!(turns < 100, "cancelled driver failed to stop");
        }

        assert!(!completed.get(), "completion callback ran after cancel");
    }
}
