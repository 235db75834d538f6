//! In-memory task collection reconciled with the server and the local cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::cache::{load_meta, store_meta, LocalCache};
use crate::error::BoardError;
use crate::model::{BoardTask, LocalMeta, Priority, TaskUpdate};
use crate::remote::TasksRemote;
use crate::view::{self, Summary, ViewState};

#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Page size used by [`TaskBoard::load`].
    pub page_size: u32,
    pub undo_window: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            undo_window: Duration::from_secs(4),
        }
    }
}

#[derive(Debug)]
struct Deleted {
    task: BoardTask,
    index: usize,
    deadline: Instant,
}

/// The user's tasks in display order.
///
/// Mutations call the server first and only touch local state on success;
/// reorder and undo are local only.
pub struct TaskBoard {
    remote: Arc<dyn TasksRemote>,
    cache: Arc<dyn LocalCache>,
    config: BoardConfig,
    tasks: Vec<BoardTask>,
    deleted: HashMap<Uuid, Deleted>,
}

impl TaskBoard {
    pub fn new(remote: Arc<dyn TasksRemote>, cache: Arc<dyn LocalCache>) -> Self {
        Self::with_config(remote, cache, BoardConfig::default())
    }

    pub fn with_config(
        remote: Arc<dyn TasksRemote>,
        cache: Arc<dyn LocalCache>,
        config: BoardConfig,
    ) -> Self {
        Self {
            remote,
            cache,
            config,
            tasks: Vec::new(),
            deleted: HashMap::new(),
        }
    }

    pub fn tasks(&self) -> &[BoardTask] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&BoardTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn view(&self, state: &ViewState) -> Vec<&BoardTask> {
        view::derive(&self.tasks, state)
    }

    pub fn summary(&self) -> Summary {
        view::summarize(&self.tasks)
    }

    /// Fetches every page and merges it with the cached annotations.
    ///
    /// The server may clamp the requested page size, so a page only ends the
    /// walk when it is empty or shorter than the largest page seen so far.
    #[instrument(name = "task_board.load", skip(self))]
    pub async fn load(&mut self) -> Result<&[BoardTask], BoardError> {
        let page_size = self.config.page_size.max(1);
        let mut remote = Vec::new();
        let mut page = 1;
        let mut largest = 0;
        loop {
            let batch = self.remote.list(page, page_size).await?;
            let len = batch.len();
            remote.extend(batch);
            if len == 0 || len < largest {
                break;
            }
            largest = len;
            page += 1;
        }

        let metas: HashMap<Uuid, LocalMeta> = load_meta(self.cache.as_ref())
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        self.tasks = remote
            .into_iter()
            .map(|r| {
                let meta = metas.get(&r.id);
                BoardTask::merge(r, meta)
            })
            .collect();
        self.deleted.clear();

        info!(count = self.tasks.len(), pages = page, "Loaded tasks");
        Ok(&self.tasks)
    }

    #[instrument(name = "task_board.add", skip(self, title))]
    pub async fn add(&mut self, title: &str, priority: Priority) -> Result<&BoardTask, BoardError> {
        let title = non_blank(title)?;
        let created = self.remote.create(title).await?;
        let mut task = BoardTask::merge(created, None);
        task.priority = priority;
        task.due_at = Some(Utc::now());
        self.tasks.push(task);
        self.persist();

        let idx = self.tasks.len() - 1;
        Ok(&self.tasks[idx])
    }

    #[instrument(name = "task_board.toggle", skip(self))]
    pub async fn toggle(&mut self, id: Uuid) -> Result<&BoardTask, BoardError> {
        let idx = self.position(id)?;
        let update = TaskUpdate {
            completed: Some(!self.tasks[idx].completed),
            ..Default::default()
        };
        self.apply_update(idx, update).await
    }

    #[instrument(name = "task_board.edit", skip(self, title))]
    pub async fn edit(&mut self, id: Uuid, title: &str) -> Result<&BoardTask, BoardError> {
        let title = non_blank(title)?;
        let idx = self.position(id)?;
        let update = TaskUpdate {
            title: Some(title.to_string()),
            ..Default::default()
        };
        self.apply_update(idx, update).await
    }

    /// Deletes on the server and keeps the task restorable by [`undo`](Self::undo)
    /// for the configured window.
    #[instrument(name = "task_board.delete", skip(self))]
    pub async fn delete(&mut self, id: Uuid) -> Result<(), BoardError> {
        let idx = self.position(id)?;
        self.remote.delete(id).await?;

        let task = self.tasks.remove(idx);
        self.persist();
        let now = Instant::now();
        self.deleted.retain(|_, d| d.deadline >= now);
        self.deleted.insert(
            id,
            Deleted {
                task,
                index: idx,
                deadline: now + self.config.undo_window,
            },
        );
        debug!(undo_window = ?self.config.undo_window, "Task deleted, undo armed");
        Ok(())
    }

    /// Puts a deleted task back at its old position. Local only: the server
    /// copy stays deleted and the task disappears on the next [`load`](Self::load).
    #[instrument(name = "task_board.undo", skip(self))]
    pub fn undo(&mut self, id: Uuid) -> Result<&BoardTask, BoardError> {
        let deleted = self
            .deleted
            .remove(&id)
            .ok_or_else(|| BoardError::task_not_found(id))?;
        if Instant::now() > deleted.deadline {
            return Err(BoardError::UndoExpired { id });
        }

        let idx = deleted.index.min(self.tasks.len());
        self.tasks.insert(idx, deleted.task);
        self.persist();
        Ok(&self.tasks[idx])
    }

    /// Moves the task at `from` to `to`. Local only.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), BoardError> {
        let len = self.tasks.len();
        if from >= len || to >= len {
            return Err(BoardError::validation(format!(
                "reorder {from} -> {to} out of range for {len} tasks"
            )));
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        self.persist();
        Ok(())
    }

    async fn apply_update(&mut self, idx: usize, update: TaskUpdate) -> Result<&BoardTask, BoardError> {
        let id = self.tasks[idx].id;
        let remote = self.remote.update(id, &update).await?;

        let task = &mut self.tasks[idx];
        task.apply_remote(remote);
        task.due_at = Some(Utc::now());
        self.persist();
        Ok(&self.tasks[idx])
    }

    fn position(&self, id: Uuid) -> Result<usize, BoardError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| BoardError::task_not_found(id))
    }

    /// Cache failures never fail the operation that triggered them.
    fn persist(&self) {
        let metas: Vec<LocalMeta> = self.tasks.iter().map(BoardTask::meta).collect();
        if let Err(e) = store_meta(self.cache.as_ref(), &metas) {
            warn!(error = %e, "Failed to persist task cache");
        }
    }
}

fn non_blank(title: &str) -> Result<&str, BoardError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(BoardError::validation("task title required"));
    }
    Ok(trimmed)
}
