//! PostgreSQL implementation of the progress store

use async_trait::async_trait;
use ch_core::traits::Id;
use ch_db::{
    ArticleTaskRepository, BlockProgressRepository, InvoiceRepository, LotRepository,
    MarketArticleRepository, MarketArticleRow, OperationalTaskRepository, ProjectRepository,
    SubTaskPercentageWrite, SubTaskRepository,
};
use ch_models::{
    ArticleTask, BlockArticleProgress, Invoice, Lot, OperationalTask, OperationalTaskStatus,
    Project, SubTask,
};
use sqlx::PgPool;

use crate::error::EngineResult;
use crate::snapshot::{ArticleSnapshot, SubTaskSnapshot, TaskSnapshot};
use crate::store::{BlockBatchWrite, NewSubTaskRecord, ProgressStore};

/// Progress store backed by the ch-db repositories
pub struct PgProgressStore {
    projects: ProjectRepository,
    lots: LotRepository,
    articles: MarketArticleRepository,
    article_tasks: ArticleTaskRepository,
    sub_tasks: SubTaskRepository,
    operational_tasks: OperationalTaskRepository,
    block_progress: BlockProgressRepository,
    invoices: InvoiceRepository,
}

impl PgProgressStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            projects: ProjectRepository::new(pool.clone()),
            lots: LotRepository::new(pool.clone()),
            articles: MarketArticleRepository::new(pool.clone()),
            article_tasks: ArticleTaskRepository::new(pool.clone()),
            sub_tasks: SubTaskRepository::new(pool.clone()),
            operational_tasks: OperationalTaskRepository::new(pool.clone()),
            block_progress: BlockProgressRepository::new(pool.clone()),
            invoices: InvoiceRepository::new(pool),
        }
    }

    async fn build_snapshot(&self, article: MarketArticleRow) -> EngineResult<ArticleSnapshot> {
        let tasks = self.article_tasks.find_by_article(article.id).await?;
        let mut task_snapshots = Vec::with_capacity(tasks.len());

        for task in tasks {
            let sub_tasks = self.sub_tasks.find_by_task(task.id).await?;
            let operational_progress = match task.operational_task_id {
                Some(op_id) => self
                    .operational_tasks
                    .find_by_id(op_id)
                    .await?
                    .map(|t| t.progress as f64),
                None => None,
            };

            task_snapshots.push(TaskSnapshot {
                id: task.id,
                duration_days: task.duration_days,
                operational_progress,
                sub_tasks: sub_tasks
                    .into_iter()
                    .map(|s| SubTaskSnapshot {
                        id: s.id,
                        completion_percentage: s.completion_percentage,
                        weight: s.weight,
                        is_reserve: s.is_reserve,
                    })
                    .collect(),
            });
        }

        Ok(ArticleSnapshot {
            id: article.id,
            total_amount: article.total_amount,
            tasks: task_snapshots,
        })
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn article_snapshot(&self, article_id: Id) -> EngineResult<Option<ArticleSnapshot>> {
        match self.articles.find_by_id(article_id).await? {
            Some(article) => Ok(Some(self.build_snapshot(article).await?)),
            None => Ok(None),
        }
    }

    async fn project_article_snapshots(
        &self,
        project_id: Id,
    ) -> EngineResult<Vec<ArticleSnapshot>> {
        let articles = self.articles.find_by_project(project_id).await?;
        let mut snapshots = Vec::with_capacity(articles.len());
        for article in articles {
            snapshots.push(self.build_snapshot(article).await?);
        }
        Ok(snapshots)
    }

    async fn project(&self, project_id: Id) -> EngineResult<Option<Project>> {
        Ok(self.projects.find_by_id(project_id).await?.map(Into::into))
    }

    async fn project_lots(&self, project_id: Id) -> EngineResult<Vec<Lot>> {
        Ok(self
            .lots
            .find_by_project(project_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn billable_invoices(&self, project_id: Id) -> EngineResult<Vec<Invoice>> {
        Ok(self
            .invoices
            .find_billable_by_project(project_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn find_block_progress(
        &self,
        block_id: Id,
        article_id: Id,
        floor_number: Option<i32>,
    ) -> EngineResult<Option<BlockArticleProgress>> {
        Ok(self
            .block_progress
            .find_unique(block_id, article_id, floor_number)
            .await?
            .map(Into::into))
    }

    async fn block_progress_for_article(
        &self,
        article_id: Id,
    ) -> EngineResult<Vec<BlockArticleProgress>> {
        Ok(self
            .block_progress
            .find_by_article(article_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn apply_block_batch(
        &self,
        batch: BlockBatchWrite,
    ) -> EngineResult<BlockArticleProgress> {
        let writes: Vec<SubTaskPercentageWrite> = batch
            .sub_task_updates
            .iter()
            .map(|u| SubTaskPercentageWrite {
                sub_task_id: u.sub_task_id,
                percentage: u.percentage,
            })
            .collect();

        let row = self
            .block_progress
            .apply_batch(
                batch.row_id,
                &writes,
                batch.completion_percentage,
                batch.completed_amount,
                batch.pv_document_url.as_deref(),
            )
            .await?;

        Ok(row.into())
    }

    async fn overwrite_article_progress(
        &self,
        article_id: Id,
        completion_percentage: f64,
        completed_amount: f64,
    ) -> EngineResult<u64> {
        Ok(self
            .block_progress
            .overwrite_for_article(article_id, completion_percentage, completed_amount)
            .await?)
    }

    async fn article_task(&self, task_id: Id) -> EngineResult<Option<ArticleTask>> {
        Ok(self
            .article_tasks
            .find_by_id(task_id)
            .await?
            .map(Into::into))
    }

    async fn article_task_for_operational(
        &self,
        operational_task_id: Id,
    ) -> EngineResult<Option<ArticleTask>> {
        Ok(self
            .article_tasks
            .find_by_operational_task(operational_task_id)
            .await?
            .map(Into::into))
    }

    async fn sub_task(&self, sub_task_id: Id) -> EngineResult<Option<SubTask>> {
        Ok(self.sub_tasks.find_by_id(sub_task_id).await?.map(Into::into))
    }

    async fn task_sub_tasks(&self, task_id: Id) -> EngineResult<Vec<SubTask>> {
        Ok(self
            .sub_tasks
            .find_by_task(task_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn insert_sub_task(&self, record: NewSubTaskRecord) -> EngineResult<SubTask> {
        let row = self
            .sub_tasks
            .create(ch_db::CreateSubTaskDto {
                task_id: record.task_id,
                code: record.code,
                designation: record.designation,
                weight: record.weight,
                is_reserve: record.is_reserve,
                duration_days: record.duration_days,
            })
            .await?;
        Ok(row.into())
    }

    async fn set_sub_task_duration(&self, sub_task_id: Id, duration_days: f64) -> EngineResult<()> {
        Ok(self
            .sub_tasks
            .update_duration(sub_task_id, duration_days)
            .await?)
    }

    async fn set_task_duration(&self, task_id: Id, duration_days: f64) -> EngineResult<()> {
        Ok(self
            .article_tasks
            .update_duration(task_id, duration_days)
            .await?)
    }

    async fn set_operational_progress(
        &self,
        id: Id,
        progress: i32,
    ) -> EngineResult<OperationalTask> {
        Ok(self
            .operational_tasks
            .update_progress(id, progress)
            .await?
            .into())
    }

    async fn set_operational_status(
        &self,
        id: Id,
        status: OperationalTaskStatus,
    ) -> EngineResult<OperationalTask> {
        Ok(self
            .operational_tasks
            .update_status(id, status)
            .await?
            .into())
    }
}
