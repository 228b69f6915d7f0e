//! In-memory progress store used by the service tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ch_core::traits::Id;
use ch_models::{
    ArticleTask, BlockArticleProgress, Invoice, Lot, OperationalTask, OperationalTaskStatus,
    Project, SubTask,
};

use crate::error::{EngineError, EngineResult};
use crate::snapshot::{ArticleSnapshot, SubTaskSnapshot, TaskSnapshot};
use crate::store::{BlockBatchWrite, NewSubTaskRecord, ProgressStore};

#[derive(Default)]
struct State {
    projects: HashMap<Id, Project>,
    // article id -> (project id, total amount)
    articles: HashMap<Id, (Id, f64)>,
    tasks: HashMap<Id, ArticleTask>,
    sub_tasks: HashMap<Id, SubTask>,
    operational_tasks: HashMap<Id, OperationalTask>,
    block_rows: HashMap<Id, BlockArticleProgress>,
    // lot id -> (project id, lot)
    lots: HashMap<Id, (Id, Lot)>,
    invoices: Vec<Invoice>,
    next_id: Id,
}

/// Hand-rolled store for exercising the engine without a database
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(state: &mut State) -> Id {
        state.next_id += 1;
        state.next_id
    }

    pub fn add_project(&self, project: Project) -> Id {
        let mut state = self.state.lock().unwrap();
        let id = project.id.unwrap_or_else(|| Self::next_id(&mut state));
        let mut project = project;
        project.id = Some(id);
        state.projects.insert(id, project);
        id
    }

    pub fn add_article(&self, project_id: Id, total_amount: f64) -> Id {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        state.articles.insert(id, (project_id, total_amount));
        id
    }

    pub fn add_task(
        &self,
        article_id: Id,
        duration_days: f64,
        operational_task_id: Option<Id>,
    ) -> Id {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        state.tasks.insert(
            id,
            ArticleTask {
                id: Some(id),
                article_id,
                designation: format!("task {}", id),
                duration_days,
                operational_task_id,
                ..Default::default()
            },
        );
        id
    }

    pub fn add_sub_task(&self, task_id: Id, pct: f64, weight: f64, is_reserve: bool) -> Id {
        self.add_sub_task_with_duration(task_id, pct, weight, is_reserve, 0.0)
    }

    pub fn add_sub_task_with_duration(
        &self,
        task_id: Id,
        pct: f64,
        weight: f64,
        is_reserve: bool,
        duration_days: f64,
    ) -> Id {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        state.sub_tasks.insert(
            id,
            SubTask {
                id: Some(id),
                task_id,
                code: format!("ST-{}", id),
                designation: format!("sub-task {}", id),
                completion_percentage: pct,
                weight,
                is_reserve,
                duration_days,
                ..Default::default()
            },
        );
        id
    }

    pub fn add_operational_task(&self, progress: i32) -> Id {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        state.operational_tasks.insert(
            id,
            OperationalTask {
                id: Some(id),
                designation: format!("operational task {}", id),
                progress,
                status: OperationalTaskStatus::InProgress,
                ..Default::default()
            },
        );
        id
    }

    pub fn add_block_row(&self, block_id: Id, article_id: Id, floor_number: Option<i32>) -> Id {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        state.block_rows.insert(
            id,
            BlockArticleProgress {
                id: Some(id),
                block_id,
                article_id,
                floor_number,
                ..Default::default()
            },
        );
        id
    }

    pub fn add_lot(&self, project_id: Id, market_id: Id, name: &str, position: i32) -> Id {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        state.lots.insert(
            id,
            (
                project_id,
                Lot {
                    id: Some(id),
                    market_id,
                    name: name.to_string(),
                    position,
                    ..Default::default()
                },
            ),
        );
        id
    }

    pub fn add_invoice(&self, invoice: Invoice) {
        self.state.lock().unwrap().invoices.push(invoice);
    }

    pub fn block_row(&self, id: Id) -> Option<BlockArticleProgress> {
        self.state.lock().unwrap().block_rows.get(&id).cloned()
    }

    pub fn task(&self, id: Id) -> Option<ArticleTask> {
        self.state.lock().unwrap().tasks.get(&id).cloned()
    }

    pub fn sub_task_value(&self, id: Id) -> Option<f64> {
        self.state
            .lock()
            .unwrap()
            .sub_tasks
            .get(&id)
            .map(|s| s.completion_percentage)
    }

    fn snapshot_locked(state: &State, article_id: Id) -> Option<ArticleSnapshot> {
        let (_, total_amount) = state.articles.get(&article_id)?;

        let mut task_ids: Vec<Id> = state
            .tasks
            .values()
            .filter(|t| t.article_id == article_id)
            .map(|t| t.id.unwrap())
            .collect();
        task_ids.sort_unstable();

        let tasks = task_ids
            .into_iter()
            .map(|task_id| {
                let task = &state.tasks[&task_id];
                let operational_progress = task
                    .operational_task_id
                    .and_then(|op_id| state.operational_tasks.get(&op_id))
                    .map(|op| op.progress as f64);

                let mut sub_tasks: Vec<&SubTask> = state
                    .sub_tasks
                    .values()
                    .filter(|s| s.task_id == task_id)
                    .collect();
                sub_tasks.sort_unstable_by_key(|s| s.id);

                TaskSnapshot {
                    id: task_id,
                    duration_days: task.duration_days,
                    operational_progress,
                    sub_tasks: sub_tasks
                        .into_iter()
                        .map(|s| SubTaskSnapshot {
                            id: s.id.unwrap(),
                            completion_percentage: s.completion_percentage,
                            weight: s.weight,
                            is_reserve: s.is_reserve,
                        })
                        .collect(),
                }
            })
            .collect();

        Some(ArticleSnapshot {
            id: article_id,
            total_amount: *total_amount,
            tasks,
        })
    }
}

#[async_trait]
impl ProgressStore for InMemoryStore {
    async fn article_snapshot(&self, article_id: Id) -> EngineResult<Option<ArticleSnapshot>> {
        let state = self.state.lock().unwrap();
        Ok(Self::snapshot_locked(&state, article_id))
    }

    async fn project_article_snapshots(
        &self,
        project_id: Id,
    ) -> EngineResult<Vec<ArticleSnapshot>> {
        let state = self.state.lock().unwrap();
        let mut article_ids: Vec<Id> = state
            .articles
            .iter()
            .filter(|(_, (pid, _))| *pid == project_id)
            .map(|(id, _)| *id)
            .collect();
        article_ids.sort_unstable();

        Ok(article_ids
            .into_iter()
            .filter_map(|id| Self::snapshot_locked(&state, id))
            .collect())
    }

    async fn project(&self, project_id: Id) -> EngineResult<Option<Project>> {
        Ok(self.state.lock().unwrap().projects.get(&project_id).cloned())
    }

    async fn project_lots(&self, project_id: Id) -> EngineResult<Vec<Lot>> {
        let state = self.state.lock().unwrap();
        let mut lots: Vec<Lot> = state
            .lots
            .values()
            .filter(|(pid, _)| *pid == project_id)
            .map(|(_, lot)| lot.clone())
            .collect();
        lots.sort_by_key(|l| (l.position, l.id));
        Ok(lots)
    }

    async fn billable_invoices(&self, project_id: Id) -> EngineResult<Vec<Invoice>> {
        let state = self.state.lock().unwrap();
        let mut invoices: Vec<Invoice> = state
            .invoices
            .iter()
            .filter(|i| i.project_id == project_id && i.status.is_billable())
            .cloned()
            .collect();
        invoices.sort_by_key(|i| i.invoice_date);
        Ok(invoices)
    }

    async fn find_block_progress(
        &self,
        block_id: Id,
        article_id: Id,
        floor_number: Option<i32>,
    ) -> EngineResult<Option<BlockArticleProgress>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .block_rows
            .values()
            .find(|r| {
                r.block_id == block_id
                    && r.article_id == article_id
                    && r.floor_number == floor_number
            })
            .cloned())
    }

    async fn block_progress_for_article(
        &self,
        article_id: Id,
    ) -> EngineResult<Vec<BlockArticleProgress>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<BlockArticleProgress> = state
            .block_rows
            .values()
            .filter(|r| r.article_id == article_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn apply_block_batch(
        &self,
        batch: BlockBatchWrite,
    ) -> EngineResult<BlockArticleProgress> {
        let mut state = self.state.lock().unwrap();

        // All-or-nothing, mirroring the transactional Pg implementation
        for update in &batch.sub_task_updates {
            if !state.sub_tasks.contains_key(&update.sub_task_id) {
                return Err(EngineError::not_found("SubTask", update.sub_task_id));
            }
        }
        if !state.block_rows.contains_key(&batch.row_id) {
            return Err(EngineError::not_found("BlockArticleProgress", batch.row_id));
        }

        for update in &batch.sub_task_updates {
            state
                .sub_tasks
                .get_mut(&update.sub_task_id)
                .unwrap()
                .completion_percentage = update.percentage;
        }

        let row = state.block_rows.get_mut(&batch.row_id).unwrap();
        row.completion_percentage = batch.completion_percentage;
        row.completed_amount = batch.completed_amount;
        if let Some(url) = batch.pv_document_url {
            row.pv_uploaded = true;
            row.pv_document_url = Some(url);
        }

        Ok(row.clone())
    }

    async fn overwrite_article_progress(
        &self,
        article_id: Id,
        completion_percentage: f64,
        completed_amount: f64,
    ) -> EngineResult<u64> {
        let mut state = self.state.lock().unwrap();
        let mut touched = 0;
        for row in state.block_rows.values_mut() {
            if row.article_id == article_id {
                row.completion_percentage = completion_percentage;
                row.completed_amount = completed_amount;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn article_task(&self, task_id: Id) -> EngineResult<Option<ArticleTask>> {
        Ok(self.state.lock().unwrap().tasks.get(&task_id).cloned())
    }

    async fn article_task_for_operational(
        &self,
        operational_task_id: Id,
    ) -> EngineResult<Option<ArticleTask>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tasks
            .values()
            .find(|t| t.operational_task_id == Some(operational_task_id))
            .cloned())
    }

    async fn sub_task(&self, sub_task_id: Id) -> EngineResult<Option<SubTask>> {
        Ok(self.state.lock().unwrap().sub_tasks.get(&sub_task_id).cloned())
    }

    async fn task_sub_tasks(&self, task_id: Id) -> EngineResult<Vec<SubTask>> {
        let state = self.state.lock().unwrap();
        let mut sub_tasks: Vec<SubTask> = state
            .sub_tasks
            .values()
            .filter(|s| s.task_id == task_id)
            .cloned()
            .collect();
        sub_tasks.sort_by_key(|s| s.id);
        Ok(sub_tasks)
    }

    async fn insert_sub_task(&self, record: NewSubTaskRecord) -> EngineResult<SubTask> {
        let mut state = self.state.lock().unwrap();
        if !state.tasks.contains_key(&record.task_id) {
            return Err(EngineError::not_found("ArticleTask", record.task_id));
        }
        let id = Self::next_id(&mut state);
        let sub_task = SubTask {
            id: Some(id),
            task_id: record.task_id,
            code: record.code,
            designation: record.designation,
            completion_percentage: 0.0,
            weight: record.weight,
            is_reserve: record.is_reserve,
            duration_days: record.duration_days,
            ..Default::default()
        };
        state.sub_tasks.insert(id, sub_task.clone());
        Ok(sub_task)
    }

    async fn set_sub_task_duration(&self, sub_task_id: Id, duration_days: f64) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.sub_tasks.get_mut(&sub_task_id) {
            Some(sub_task) => {
                sub_task.duration_days = duration_days;
                Ok(())
            }
            None => Err(EngineError::not_found("SubTask", sub_task_id)),
        }
    }

    async fn set_task_duration(&self, task_id: Id, duration_days: f64) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.tasks.get_mut(&task_id) {
            Some(task) => {
                task.duration_days = duration_days;
                Ok(())
            }
            None => Err(EngineError::not_found("ArticleTask", task_id)),
        }
    }

    async fn set_operational_progress(
        &self,
        id: Id,
        progress: i32,
    ) -> EngineResult<OperationalTask> {
        let mut state = self.state.lock().unwrap();
        match state.operational_tasks.get_mut(&id) {
            Some(task) => {
                task.progress = progress;
                Ok(task.clone())
            }
            None => Err(EngineError::not_found("OperationalTask", id)),
        }
    }

    async fn set_operational_status(
        &self,
        id: Id,
        status: OperationalTaskStatus,
    ) -> EngineResult<OperationalTask> {
        let mut state = self.state.lock().unwrap();
        match state.operational_tasks.get_mut(&id) {
            Some(task) => {
                task.status = status;
                if status == OperationalTaskStatus::Done {
                    task.progress = 100;
                }
                Ok(task.clone())
            }
            None => Err(EngineError::not_found("OperationalTask", id)),
        }
    }
}
