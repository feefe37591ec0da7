//! 进度服务
//!
//! 写路径：读取整行 → 内存中级联 → 一次原子替换。
//! 不加锁、不做乐观校验、不重试，并发写入以最后写入为准。
//!
//! 读路径：按快照版本复用可用性解析结果

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;
use progress_shared::observability::metrics;
use tracing::{info, instrument, warn};

use super::dto::{
    AvailabilityResponse, BatchUpdateResponse, InvalidationResponse, ProgressResponse,
    TaskUpdateItem, TeamAvailabilityRequest, UpdateModuleResponse, UpdateTaskResponse,
};
use crate::aggregate::{MultiActorAggregator, TeamAvailability, TeamMember};
use crate::cascade::{ChangeBatch, TaskStateChange, cascade_many, set_module_state};
use crate::error::{ProgressError, Result};
use crate::graph::ProgressionGraph;
use crate::invalidation::InvalidationDetector;
use crate::metadata::GraphCache;
use crate::models::{ActorId, ModuleId, ProgressSnapshot, TaskId, TaskState, UpdateRecord};
use crate::repository::{ProgressRepositoryTrait, ProgressRow};
use crate::resolver::{AvailabilityCache, HideoutResolver};

pub struct ProgressService {
    repo: Arc<dyn ProgressRepositoryTrait>,
    graphs: Arc<GraphCache>,
    availability_cache: Mutex<AvailabilityCache>,
    update_source: String,
}

impl ProgressService {
    pub fn new(
        repo: Arc<dyn ProgressRepositoryTrait>,
        graphs: Arc<GraphCache>,
        update_source: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            graphs,
            availability_cache: Mutex::new(AvailabilityCache::new()),
            update_source: update_source.into(),
        }
    }

    /// 获取角色进度，不存在时返回空快照（版本 0）
    #[instrument(skip(self), fields(actor_id = %actor_id))]
    pub async fn get_progress(&self, actor_id: &ActorId) -> Result<ProgressResponse> {
        let row = self.load_row(actor_id).await?;
        Ok(ProgressResponse {
            actor_id: row.actor_id,
            version: row.version,
            progress: row.snapshot,
        })
    }

    /// 更新单个任务状态并级联
    #[instrument(skip(self), fields(actor_id = %actor_id, task_id = %task_id, state = %state))]
    pub async fn update_task(
        &self,
        actor_id: &ActorId,
        task_id: &TaskId,
        state: TaskState,
    ) -> Result<UpdateTaskResponse> {
        let items = [TaskUpdateItem {
            id: task_id.clone(),
            state,
        }];
        let (version, update) = self.apply_task_updates(actor_id, &items, "single").await?;

        Ok(UpdateTaskResponse {
            actor_id: actor_id.clone(),
            task_id: task_id.clone(),
            state,
            version,
            update,
        })
    }

    /// 批量更新任务状态，合并为一个批次与一次写入
    #[instrument(skip(self, items), fields(actor_id = %actor_id, count = items.len()))]
    pub async fn update_tasks(
        &self,
        actor_id: &ActorId,
        items: Vec<TaskUpdateItem>,
    ) -> Result<BatchUpdateResponse> {
        if items.is_empty() {
            return Err(ProgressError::Validation("更新列表不能为空".to_string()));
        }

        let (version, update) = self.apply_task_updates(actor_id, &items, "batch").await?;

        Ok(BatchUpdateResponse {
            actor_id: actor_id.clone(),
            accepted: items,
            version,
            update,
        })
    }

    /// 设置藏身处模块完成状态
    #[instrument(skip(self), fields(actor_id = %actor_id, module_id = %module_id, complete = complete))]
    pub async fn update_module(
        &self,
        actor_id: &ActorId,
        module_id: &ModuleId,
        complete: bool,
    ) -> Result<UpdateModuleResponse> {
        let start = Instant::now();
        let graph = self.graphs.get_or_refresh().await?;
        let module = graph
            .hideout
            .get(module_id)
            .ok_or_else(|| ProgressError::ModuleNotFound(module_id.clone()))?;

        let row = self.load_row(actor_id).await?;
        let mut snapshot = row.snapshot;
        let at = now_millis();

        let outcome = set_module_state(
            &graph.hideout,
            &snapshot.hideout_modules,
            module,
            complete,
            at,
        );
        snapshot.hideout_modules = outcome.modules;

        let (version, update) = self
            .persist(actor_id, snapshot, &outcome.changes, at)
            .await?;

        let changes = outcome.changes.len();
        metrics::record_cascade_update("hideout", changes, start.elapsed().as_secs_f64());
        info!(version, changes, "藏身处模块状态已更新");

        Ok(UpdateModuleResponse {
            actor_id: actor_id.clone(),
            module_id: module_id.clone(),
            complete,
            version,
            update,
        })
    }

    /// 单个角色的任务与藏身处可用性
    #[instrument(skip(self), fields(actor_id = %actor_id))]
    pub async fn actor_availability(&self, actor_id: &ActorId) -> Result<AvailabilityResponse> {
        let start = Instant::now();
        let graph = self.graphs.get_or_refresh().await?;
        let row = self.load_row(actor_id).await?;

        let level = MultiActorAggregator::new(&graph).effective_level(&row.snapshot, true);
        let (tasks, cache_hit) = self.availability_cache.lock().resolve(
            &graph,
            actor_id,
            row.version,
            &row.snapshot,
            level,
        );
        let hideout = HideoutResolver::resolve(&graph.hideout, &row.snapshot);

        metrics::record_availability_resolution(1, cache_hit, start.elapsed().as_secs_f64());

        Ok(AvailabilityResponse {
            actor_id: row.actor_id,
            version: row.version,
            level,
            tasks: tasks.as_ref().clone(),
            hideout,
        })
    }

    /// 玩家与队友的聚合可用性
    #[instrument(skip(self, request), fields(primary = %request.primary, teammates = request.teammates.len()))]
    pub async fn team_availability(
        &self,
        request: TeamAvailabilityRequest,
    ) -> Result<TeamAvailability> {
        let start = Instant::now();
        let graph = self.graphs.get_or_refresh().await?;

        let mut seen = HashSet::new();
        let mut actor_ids = Vec::with_capacity(request.teammates.len() + 1);
        for id in std::iter::once(request.primary.clone()).chain(request.teammates) {
            if seen.insert(id.clone()) {
                actor_ids.push(id);
            }
        }

        let mut rows = self.repo.get_progress_many(&actor_ids).await?;
        let members: Vec<TeamMember> = actor_ids
            .iter()
            .map(|id| {
                let row = rows
                    .iter()
                    .position(|r| &r.actor_id == id)
                    .map(|i| rows.swap_remove(i))
                    .unwrap_or_else(|| ProgressRow::empty(id.clone()));
                TeamMember {
                    actor_id: id.clone(),
                    snapshot: row.snapshot,
                    version: row.version,
                    primary: *id == request.primary,
                }
            })
            .collect();

        let team = {
            let mut cache = self.availability_cache.lock();
            MultiActorAggregator::new(&graph).aggregate(&members, Some(&mut *cache))
        };

        metrics::record_availability_resolution(
            members.len(),
            false,
            start.elapsed().as_secs_f64(),
        );
        Ok(team)
    }

    /// 检查角色进度中不可能出现的完成状态
    #[instrument(skip(self), fields(actor_id = %actor_id))]
    pub async fn invalidations(&self, actor_id: &ActorId) -> Result<InvalidationResponse> {
        let graph = self.graphs.get_or_refresh().await?;
        let row = self.load_row(actor_id).await?;
        let findings = InvalidationDetector::scan(&graph.tasks, &row.snapshot.completions);

        if !findings.is_empty() {
            warn!(count = findings.len(), "进度中存在不一致的完成状态");
        }

        Ok(InvalidationResponse {
            actor_id: row.actor_id,
            version: row.version,
            findings,
        })
    }

    async fn apply_task_updates(
        &self,
        actor_id: &ActorId,
        items: &[TaskUpdateItem],
        kind: &str,
    ) -> Result<(i64, Option<UpdateRecord>)> {
        let start = Instant::now();
        let graph = self.graphs.get_or_refresh().await?;
        ensure_tasks_exist(&graph, items)?;

        let row = self.load_row(actor_id).await?;
        let mut snapshot = row.snapshot;
        let at = now_millis();

        let events: Vec<TaskStateChange> = items
            .iter()
            .map(|item| TaskStateChange::from_target(item.id.clone(), item.state, at))
            .collect();
        let outcome = cascade_many(&graph.tasks, &snapshot.completions, &events);
        snapshot.completions = outcome.completions;

        let (version, update) = self
            .persist(actor_id, snapshot, &outcome.changes, at)
            .await?;

        let changes = outcome.changes.len();
        metrics::record_cascade_update(kind, changes, start.elapsed().as_secs_f64());
        info!(version, changes, "任务状态已更新");

        Ok((version, update))
    }

    /// 附加更新记录后整行替换
    async fn persist(
        &self,
        actor_id: &ActorId,
        mut snapshot: ProgressSnapshot,
        changes: &ChangeBatch,
        at: i64,
    ) -> Result<(i64, Option<UpdateRecord>)> {
        let update = changes.to_update_record(&self.update_source, at);
        if let Some(ref record) = update {
            snapshot.last_update = Some(record.clone());
        }

        let version = self.repo.replace_progress(actor_id, &snapshot).await?;
        self.availability_cache.lock().invalidate(actor_id);

        Ok((version, update))
    }

    async fn load_row(&self, actor_id: &ActorId) -> Result<ProgressRow> {
        Ok(self
            .repo
            .get_progress(actor_id)
            .await?
            .unwrap_or_else(|| ProgressRow::empty(actor_id.clone())))
    }
}

fn ensure_tasks_exist(graph: &ProgressionGraph, items: &[TaskUpdateItem]) -> Result<()> {
    match items.iter().find(|item| !graph.tasks.contains(&item.id)) {
        Some(missing) => Err(ProgressError::TaskNotFound(missing.id.clone())),
        None => Ok(()),
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
