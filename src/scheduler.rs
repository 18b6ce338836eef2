use crate::env::{Task, TimerId};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSource {
    Timeout,
    AnimationFrame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduledTask {
    id: TimerId,
    due_at: i64,
    order: u64,
    source: TaskSource,
    task: Task,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub id: TimerId,
    pub due_at: i64,
    pub order: u64,
    pub source: TaskSource,
    pub task: Task,
}

/// Virtual-time queue for timeouts and animation frames. Tasks run in
/// `(due_at, order)` order; frames land on fixed frame boundaries so every
/// frame request made inside one frame runs together in the next.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    tasks: Vec<ScheduledTask>,
    next_id: u64,
    next_order: u64,
    frame_interval_ms: i64,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new(16)
    }
}

impl TaskQueue {
    pub fn new(frame_interval_ms: i64) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            next_order: 0,
            frame_interval_ms: frame_interval_ms.max(1),
        }
    }

    pub fn frame_interval_ms(&self) -> i64 {
        self.frame_interval_ms
    }

    pub fn set_frame_interval_ms(&mut self, interval_ms: i64) -> Result<()> {
        if interval_ms <= 0 {
            return Err(Error::InvalidConfig(
                "frame interval requires at least 1ms".into(),
            ));
        }
        self.frame_interval_ms = interval_ms;
        Ok(())
    }

    pub fn schedule_timeout(&mut self, now_ms: i64, task: Task, delay_ms: i64) -> TimerId {
        let due_at = now_ms.saturating_add(delay_ms.max(0));
        self.push(due_at, TaskSource::Timeout, task)
    }

    pub fn request_frame(&mut self, now_ms: i64, task: Task) -> TimerId {
        let due_at = self.next_frame_at(now_ms);
        self.push(due_at, TaskSource::AnimationFrame, task)
    }

    /// First frame boundary strictly after `now_ms`.
    pub fn next_frame_at(&self, now_ms: i64) -> i64 {
        now_ms
            .div_euclid(self.frame_interval_ms)
            .saturating_add(1)
            .saturating_mul(self.frame_interval_ms)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before != self.tasks.len()
    }

    pub fn clear(&mut self) -> usize {
        let cleared = self.tasks.len();
        self.tasks.clear();
        cleared
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending(&self) -> Vec<PendingTask> {
        let mut pending = self
            .tasks
            .iter()
            .map(|task| PendingTask {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                source: task.source,
                task: task.task.clone(),
            })
            .collect::<Vec<_>>();
        pending.sort_by_key(|task| (task.due_at, task.order));
        pending
    }

    /// Removes and returns the earliest task due at or before `due_limit`.
    pub fn pop_due(&mut self, due_limit: Option<i64>) -> Option<PendingTask> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)?;
        let task = self.tasks.remove(idx);
        Some(PendingTask {
            id: task.id,
            due_at: task.due_at,
            order: task.order,
            source: task.source,
            task: task.task,
        })
    }

    fn push(&mut self, due_at: i64, source: TaskSource, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let order = self.next_order;
        self.next_order += 1;
        self.tasks.push(ScheduledTask {
            id,
            due_at,
            order,
            source,
            task,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_land_on_the_next_boundary() {
        let mut queue = TaskQueue::new(16);
        assert_eq!(queue.next_frame_at(0), 16);
        assert_eq!(queue.next_frame_at(15), 16);
        assert_eq!(queue.next_frame_at(16), 32);
        let id = queue.request_frame(5, Task::HeaderFrame);
        let pending = queue.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
        assert_eq!(pending[0].due_at, 16);
        assert_eq!(pending[0].source, TaskSource::AnimationFrame);
    }

    #[test]
    fn pop_due_respects_limit_and_insertion_order() {
        let mut queue = TaskQueue::new(16);
        queue.schedule_timeout(0, Task::CounterFrame, 20);
        queue.request_frame(0, Task::RevealFrame);
        queue.request_frame(0, Task::HeaderFrame);

        assert_eq!(queue.pop_due(Some(15)), None);
        let first = queue.pop_due(Some(16)).map(|task| task.task);
        let second = queue.pop_due(Some(16)).map(|task| task.task);
        assert_eq!(first, Some(Task::RevealFrame));
        assert_eq!(second, Some(Task::HeaderFrame));
        assert_eq!(queue.pop_due(Some(16)), None);
        assert_eq!(queue.pop_due(None).map(|task| task.due_at), Some(20));
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_reports_whether_task_existed() {
        let mut queue = TaskQueue::new(16);
        let id = queue.schedule_timeout(0, Task::HeaderFrame, 100);
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
    }

    #[test]
    fn zero_frame_interval_is_rejected() {
        let mut queue = TaskQueue::default();
        assert!(matches!(
            queue.set_frame_interval_ms(0),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(queue.frame_interval_ms(), 16);
    }
}
