//! Task submission boundary
//!
//! The consumer side of the session: an in-memory task board, the checks a
//! connected account must pass to submit work for a task, form validation,
//! and a simulated asynchronous submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::account::WalletAccount;
use crate::config::SessionConfig;
use crate::error::SubmissionError;
use crate::manager::SessionManager;
use crate::state::WalletState;

pub const LINK_REQUIRED_MESSAGE: &str = "Submission link is required";
pub const LINK_INVALID_MESSAGE: &str = "Enter a valid URL or IPFS link";

const LINK_SCHEMES: [&str; 3] = ["ipfs://", "https://", "http://"];
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Bounty task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Claimed,
    Submitted,
    Completed,
    Disputed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Claimed => "claimed",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Disputed => "disputed",
        }
    }

    /// Numeric status as stored by the bounty contract (0 = open .. 4 = disputed)
    pub fn code(&self) -> u64 {
        match self {
            Self::Open => 0,
            Self::Claimed => 1,
            Self::Submitted => 2,
            Self::Completed => 3,
            Self::Disputed => 4,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub amount: u64,
    pub asset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    /// Address of the claiming account
    pub claimed_by: Option<String>,
    pub deadline: DateTime<Utc>,
    pub reward: Reward,
    /// Link to the submitted work
    #[serde(default)]
    pub proof: Option<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        deadline: DateTime<Utc>,
        reward: Reward,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: TaskStatus::Open,
            claimed_by: None,
            deadline,
            reward,
            proof: None,
        }
    }
}

/// Whole days until the deadline, rounded up
pub fn days_left(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (deadline - now).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) != 0 {
        days + 1
    } else {
        days
    }
}

/// Check that the session may submit work for a task
///
/// Checks run in order: the task exists, its claimant equals the connected
/// address exactly, and it is claimed. A task with no claimant and a session
/// with no account compare equal, and the status check then refuses it.
pub fn authorize_submission(
    task_id: &str,
    task: Option<&Task>,
    state: &WalletState,
) -> Result<(), SubmissionError> {
    let task = task.ok_or_else(|| SubmissionError::TaskNotFound(task_id.to_string()))?;
    if task.claimed_by.as_deref() != state.address() {
        return Err(SubmissionError::NotAuthorized);
    }
    if task.status != TaskStatus::Claimed {
        return Err(SubmissionError::InvalidStatus(task.status));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionForm {
    pub submission_link: String,
    #[serde(default)]
    pub comments: String,
}

impl SubmissionForm {
    pub fn new(submission_link: impl Into<String>, comments: impl Into<String>) -> Self {
        Self {
            submission_link: submission_link.into(),
            comments: comments.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SubmissionError> {
        validate_submission_link(&self.submission_link)
    }
}

/// A link must start with `ipfs://`, `https://` or `http://` and have at
/// least one character on the same line after the scheme
pub fn validate_submission_link(link: &str) -> Result<(), SubmissionError> {
    if link.is_empty() {
        return Err(SubmissionError::InvalidForm(LINK_REQUIRED_MESSAGE.to_string()));
    }
    let valid = LINK_SCHEMES
        .iter()
        .filter_map(|scheme| link.strip_prefix(scheme))
        .any(|rest| rest.chars().next().is_some_and(|c| !is_line_terminator(c)));
    if !valid {
        return Err(SubmissionError::InvalidForm(LINK_INVALID_MESSAGE.to_string()));
    }
    Ok(())
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// In-memory task list
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: RwLock<Vec<Task>>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RwLock::new(tasks),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Task>> {
        match self.tasks.read() {
            Ok(tasks) => tasks,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Task>> {
        match self.tasks.write() {
            Ok(tasks) => tasks,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Add a task, replacing any task with the same id
    pub fn insert(&self, task: Task) {
        let mut tasks = self.write();
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => tasks.push(task),
        }
    }

    pub fn get_task_by_id(&self, id: &str) -> Option<Task> {
        self.read().iter().find(|t| t.id == id).cloned()
    }

    pub fn list(&self) -> Vec<Task> {
        self.read().clone()
    }

    /// Tasks claimed by an address
    pub fn claimed_by(&self, address: &str) -> Vec<Task> {
        self.read()
            .iter()
            .filter(|t| t.claimed_by.as_deref() == Some(address))
            .cloned()
            .collect()
    }

    /// Claim an open task for an account
    pub fn claim(&self, id: &str, account: &WalletAccount) -> Result<Task, SubmissionError> {
        self.transition(id, TaskStatus::Open, TaskStatus::Claimed, |task| {
            task.claimed_by = Some(account.address().to_string());
        })
    }

    /// Record submitted work on a claimed task
    pub fn mark_submitted(&self, id: &str, link: &str) -> Result<Task, SubmissionError> {
        self.transition(id, TaskStatus::Claimed, TaskStatus::Submitted, |task| {
            task.proof = Some(link.to_string());
        })
    }

    fn transition(
        &self,
        id: &str,
        from: TaskStatus,
        to: TaskStatus,
        update: impl FnOnce(&mut Task),
    ) -> Result<Task, SubmissionError> {
        let mut tasks = self.write();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SubmissionError::TaskNotFound(id.to_string()))?;
        if task.status != from {
            return Err(SubmissionError::InvalidTransition {
                task_id: id.to_string(),
                from: task.status,
                to,
            });
        }
        update(task);
        task.status = to;
        Ok(task.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub id: Uuid,
    pub task_id: String,
    pub submitted_by: String,
    pub submission_link: String,
    pub comments: String,
    pub submitted_at: DateTime<Utc>,
}

/// Submits work for tasks on behalf of the current session
pub struct SubmissionService {
    board: Arc<TaskBoard>,
    session: SessionManager,
    delay: Duration,
}

impl SubmissionService {
    pub fn new(board: Arc<TaskBoard>, session: SessionManager, config: &SessionConfig) -> Self {
        Self {
            board,
            session,
            delay: config.submission_delay,
        }
    }

    /// Check, validate and record a submission
    ///
    /// Checks run in order: task exists, the session's account claimed it,
    /// the task is claimed, the form is valid. The account checks run again
    /// after the delay, so a session that changed meanwhile records nothing.
    pub async fn submit(
        &self,
        task_id: &str,
        form: SubmissionForm,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let submitted_by = self.authorized_address(task_id)?;
        form.validate()?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
            if self.authorized_address(task_id)? != submitted_by {
                return Err(SubmissionError::NotAuthorized);
            }
        }

        self.board.mark_submitted(task_id, &form.submission_link)?;
        log::info!(
            "Task submitted: task_id={}, link={}",
            task_id,
            form.submission_link
        );

        Ok(SubmissionReceipt {
            id: Uuid::new_v4(),
            task_id: task_id.to_string(),
            submitted_by,
            submission_link: form.submission_link,
            comments: form.comments,
            submitted_at: Utc::now(),
        })
    }

    /// Address of the current session if it may submit for the task
    fn authorized_address(&self, task_id: &str) -> Result<String, SubmissionError> {
        let state = self.session.state();
        let task = self.board.get_task_by_id(task_id);
        authorize_submission(task_id, task.as_ref(), &state)?;
        state
            .address()
            .map(str::to_string)
            .ok_or(SubmissionError::NotAuthorized)
    }
}
