//! Task scheduler: due checks, execution, and execution logs.
//!
//! The scheduler is reactive. It never loops on its own; an external cron or
//! a user action calls [`TaskScheduler::run_due`] or [`TaskScheduler::execute`].
//! It computes and reports; persisting tasks and logs is up to the caller.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::catalog::{TaskHandler, TaskRegistry};
use super::schedule::{Schedule, is_due};
use super::types::{AiTask, JsonMap, TaskFrequency, TaskLog, TaskLogStatus, TaskOutcome};
use crate::config::SchedulerConfig;

/// A finished run: the log to append and the task as it should now be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRun {
    pub log: TaskLog,
    pub task: AiTask,
}

/// Runs catalog tasks through their registered handlers.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    registry: TaskRegistry,
    schedule: Schedule,
    handler_timeout: Option<Duration>,
}

impl TaskScheduler {
    pub fn new(registry: TaskRegistry) -> Self {
        Self {
            registry,
            schedule: Schedule::default(),
            handler_timeout: None,
        }
    }

    pub fn with_config(registry: TaskRegistry, config: &SchedulerConfig) -> Self {
        Self {
            registry,
            schedule: config.schedule(),
            handler_timeout: config.handler_timeout,
        }
    }

    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Next run for a cadence, counting from `last_run`.
    pub fn compute_next_run(
        &self,
        frequency: TaskFrequency,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        self.schedule.next_run(frequency, last_run, now)
    }

    /// Whether `task` should run at `now`.
    pub fn is_due(&self, task: &AiTask, now: DateTime<Utc>) -> bool {
        is_due(task, now)
    }

    /// Run `task` once and record the attempt.
    ///
    /// Never fails: handler errors, panics and timeouts become `failed` logs, and a
    /// task without a registered handler completes with
    /// [`TaskOutcome::NoExecutor`].
    pub async fn execute(&self, task: &AiTask) -> TaskLog {
        self.execute_at(task, Utc::now()).await
    }

    /// Like [`execute`](Self::execute), but handlers see `as_of` as the
    /// current time.
    pub async fn execute_at(&self, task: &AiTask, as_of: DateTime<Utc>) -> TaskLog {
        let started_at = Utc::now();
        info!(task_id = %task.id, task_name = %task.name, "task started");

        let Some(handler) = self.registry.get(&task.name) else {
            warn!(task_id = %task.id, task_name = %task.name, "no executor defined for task");
            return TaskLog::completed(
                task,
                started_at,
                Utc::now(),
                TaskOutcome::no_executor(&task.name),
            );
        };

        let outcome = self.run_handler(handler, task, as_of).await;

        let log = match outcome {
            Ok(data) => TaskLog::completed(task, started_at, Utc::now(), TaskOutcome::Completed { data }),
            Err(message) => TaskLog::failed(task, started_at, Utc::now(), message),
        };

        match log.status {
            TaskLogStatus::Completed => info!(
                task_id = %task.id,
                task_name = %task.name,
                duration_ms = log.duration_ms(),
                "task completed"
            ),
            TaskLogStatus::Failed => error!(
                task_id = %task.id,
                task_name = %task.name,
                duration_ms = log.duration_ms(),
                error = log.error.as_deref().unwrap_or_default(),
                "task failed"
            ),
        }

        log
    }

    /// Run the handler on its own tokio task so a panic or a timeout is
    /// contained and reported as an error message.
    async fn run_handler(
        &self,
        handler: Arc<dyn TaskHandler>,
        task: &AiTask,
        as_of: DateTime<Utc>,
    ) -> Result<JsonMap, String> {
        let owned = task.clone();
        let handle = tokio::spawn(async move { handler.run(&owned, as_of).await });

        let joined = match self.handler_timeout {
            Some(limit) => {
                let abort = handle.abort_handle();
                match tokio::time::timeout(limit, handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        abort.abort();
                        return Err(format!("task timed out after {}s", limit.as_secs()));
                    }
                }
            }
            None => handle.await,
        };

        match joined {
            Ok(result) => result.map_err(|e| format!("{e:#}")),
            Err(join_err) if join_err.is_panic() => {
                Err(format!("task panicked: {}", panic_message(join_err.into_panic())))
            }
            Err(_) => Err("task was cancelled".to_string()),
        }
    }

    /// The task as it should be stored after `log`.
    ///
    /// Status is taken from the log and stays there until the next run.
    /// Manual tasks never get a `next_run`.
    pub fn record_run(&self, task: &AiTask, log: &TaskLog) -> AiTask {
        let mut updated = task.clone();
        updated.status = log.status.into();
        updated.last_run = Some(log.started_at);
        updated.next_run = match task.frequency {
            TaskFrequency::Manual => None,
            frequency => Some(self.compute_next_run(frequency, Some(log.started_at), log.completed_at)),
        };
        updated
    }

    /// Execute every task due at `now`, one after another. Handlers see
    /// `now` as the current time.
    pub async fn run_due(&self, tasks: &[AiTask], now: DateTime<Utc>) -> Vec<TaskRun> {
        let mut runs = Vec::new();
        for task in tasks.iter().filter(|t| is_due(t, now)) {
            let log = self.execute_at(task, now).await;
            let task = self.record_run(task, &log);
            runs.push(TaskRun { log, task });
        }
        runs
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "unknown panic".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::{TaskCategory, TaskStatus};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Succeeds;

    #[async_trait::async_trait]
    impl TaskHandler for Succeeds {
        async fn run(&self, _task: &AiTask, _now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
            let mut out = JsonMap::new();
            out.insert("rows".to_string(), 3.into());
            Ok(out)
        }
    }

    struct Fails;

    #[async_trait::async_trait]
    impl TaskHandler for Fails {
        async fn run(&self, _task: &AiTask, _now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
            anyhow::bail!("record store unreachable")
        }
    }

    struct Sleeps;

    #[async_trait::async_trait]
    impl TaskHandler for Sleeps {
        async fn run(&self, _task: &AiTask, _now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(JsonMap::new())
        }
    }

    struct Panics;

    #[async_trait::async_trait]
    impl TaskHandler for Panics {
        async fn run(&self, _task: &AiTask, _now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
            panic!("handler bug")
        }
    }

    struct EchoesNow;

    #[async_trait::async_trait]
    impl TaskHandler for EchoesNow {
        async fn run(&self, _task: &AiTask, now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
            let mut out = JsonMap::new();
            out.insert("now".to_string(), now.to_rfc3339().into());
            Ok(out)
        }
    }

    struct Counts(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl TaskHandler for Counts {
        async fn run(&self, _task: &AiTask, _now: DateTime<Utc>) -> anyhow::Result<JsonMap> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(JsonMap::new())
        }
    }

    fn task(name: &str, frequency: TaskFrequency) -> AiTask {
        AiTask::new(name, "", TaskCategory::Sales, frequency).unwrap()
    }

    #[tokio::test]
    async fn successful_handler_produces_completed_log() {
        let scheduler = TaskScheduler::new(TaskRegistry::new().with_handler("ok", Succeeds));
        let t = task("ok", TaskFrequency::Daily);

        let log = scheduler.execute(&t).await;

        assert_eq!(log.status, TaskLogStatus::Completed);
        assert_eq!(log.task_id, t.id);
        assert_eq!(log.task_name, "ok");
        assert!(log.error.is_none());
        match log.result {
            Some(TaskOutcome::Completed { data }) => assert_eq!(data["rows"], 3),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(log.completed_at >= log.started_at);
    }

    #[tokio::test]
    async fn failing_handler_produces_failed_log() {
        let scheduler = TaskScheduler::new(TaskRegistry::new().with_handler("bad", Fails));
        let log = scheduler.execute(&task("bad", TaskFrequency::Daily)).await;

        assert_eq!(log.status, TaskLogStatus::Failed);
        assert!(log.result.is_none());
        assert_eq!(log.error.as_deref(), Some("record store unreachable"));
    }

    #[tokio::test]
    async fn missing_handler_is_a_successful_no_op() {
        let scheduler = TaskScheduler::new(TaskRegistry::new());
        let log = scheduler.execute(&task("Unwired Job", TaskFrequency::Weekly)).await;

        assert_eq!(log.status, TaskLogStatus::Completed);
        assert_eq!(log.result, Some(TaskOutcome::no_executor("Unwired Job")));
        assert!(log.error.is_none());
    }

    #[tokio::test]
    async fn run_due_hands_its_instant_to_handlers() {
        let scheduler = TaskScheduler::new(TaskRegistry::new().with_handler("clock", EchoesNow));
        let as_of = Utc.with_ymd_and_hms(2024, 6, 10, 23, 59, 59).unwrap();

        let runs = scheduler.run_due(&[task("clock", TaskFrequency::Daily)], as_of).await;

        match &runs[0].log.result {
            Some(TaskOutcome::Completed { data }) => assert_eq!(data["now"], as_of.to_rfc3339()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn panicking_handler_produces_failed_log() {
        let scheduler = TaskScheduler::new(TaskRegistry::new().with_handler("boom", Panics));
        let log = scheduler.execute(&task("boom", TaskFrequency::Daily)).await;

        assert_eq!(log.status, TaskLogStatus::Failed);
        assert!(log.result.is_none());
        assert_eq!(log.error.as_deref(), Some("task panicked: handler bug"));
    }

    #[tokio::test]
    async fn run_due_keeps_going_after_a_panic() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = TaskScheduler::new(
            TaskRegistry::new()
                .with_handler("boom", Panics)
                .with_handler("fine", Counts(counter.clone())),
        );
        let tasks = [task("boom", TaskFrequency::Daily), task("fine", TaskFrequency::Daily)];

        let runs = scheduler.run_due(&tasks, Utc::now()).await;

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].task.status, TaskStatus::Failed);
        assert_eq!(runs[1].task.status, TaskStatus::Completed);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_times_out() {
        let scheduler = TaskScheduler::new(TaskRegistry::new().with_handler("slow", Sleeps))
            .with_handler_timeout(Duration::from_secs(5));
        let log = scheduler.execute(&task("slow", TaskFrequency::Daily)).await;

        assert_eq!(log.status, TaskLogStatus::Failed);
        assert_eq!(log.error.as_deref(), Some("task timed out after 5s"));
    }

    #[test]
    fn record_run_advances_schedule() {
        let scheduler = TaskScheduler::new(TaskRegistry::new());
        let t = task("weekly", TaskFrequency::Weekly);
        let started = Utc.with_ymd_and_hms(2024, 6, 10, 6, 0, 0).unwrap();
        let log = TaskLog::failed(&t, started, started, "nope");

        let updated = scheduler.record_run(&t, &log);

        assert_eq!(updated.status, TaskStatus::Failed);
        assert_eq!(updated.last_run, Some(started));
        assert_eq!(
            updated.next_run,
            Some(Utc.with_ymd_and_hms(2024, 6, 17, 6, 0, 0).unwrap())
        );
        assert_eq!(updated.id, t.id);
    }

    #[test]
    fn record_run_leaves_manual_unscheduled() {
        let scheduler = TaskScheduler::new(TaskRegistry::new());
        let t = task("adhoc", TaskFrequency::Manual);
        let now = Utc::now();
        let log = TaskLog::completed(&t, now, now, TaskOutcome::no_executor("adhoc"));

        let updated = scheduler.record_run(&t, &log);
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.next_run, None);
    }

    #[tokio::test]
    async fn run_due_skips_tasks_that_are_not_due() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = TaskScheduler::new(
            TaskRegistry::new()
                .with_handler("due", Counts(counter.clone()))
                .with_handler("later", Counts(counter.clone()))
                .with_handler("off", Counts(counter.clone())),
        );
        let now = Utc::now();

        let due = task("due", TaskFrequency::Daily);
        let mut later = task("later", TaskFrequency::Daily);
        later.next_run = Some(now + chrono::Duration::hours(1));
        let off = task("off", TaskFrequency::Daily).disabled();

        let runs = scheduler.run_due(&[due.clone(), later, off], now).await;

        assert_eq!(runs.len(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(runs[0].task.id, due.id);
        assert_eq!(runs[0].task.status, TaskStatus::Completed);
        assert!(runs[0].task.next_run.is_some());
    }

    #[tokio::test]
    async fn concurrent_executions_produce_independent_logs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = TaskScheduler::new(TaskRegistry::new().with_handler("job", Counts(counter.clone())));
        let t = task("job", TaskFrequency::Daily);

        let (a, b) = tokio::join!(scheduler.execute(&t), scheduler.execute(&t));

        assert_ne!(a.id, b.id);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
