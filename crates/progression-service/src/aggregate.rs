//! 多角色聚合
//!
//! 为玩家及队友分别解析，再按阵营相关性汇总

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::graph::ProgressionGraph;
use crate::models::{ActorId, ModuleId, ProgressSnapshot, TaskId, TaskState};
use crate::resolver::{ActorAvailability, AvailabilityCache, AvailabilityResolver, HideoutResolver};

/// 参与聚合的角色
#[derive(Debug, Clone)]
pub struct TeamMember {
    pub actor_id: ActorId,
    pub snapshot: ProgressSnapshot,
    /// 存储版本号，用于命中可用性缓存
    pub version: i64,
    /// 是否为主玩家（只有主玩家可使用经验推导等级）
    pub primary: bool,
}

/// 聚合结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamAvailability {
    /// task_id -> actor_id -> 是否可接取
    pub by_task: HashMap<TaskId, HashMap<ActorId, bool>>,
    /// 对至少一个阵营相关角色可接取
    pub available_for_any: HashMap<TaskId, bool>,
    pub aggregate_state: HashMap<TaskId, TaskState>,
    /// module_id -> actor_id -> 是否可建造
    pub hideout_by_module: HashMap<ModuleId, HashMap<ActorId, bool>>,
    pub hideout_available_for_any: HashMap<ModuleId, bool>,
}

pub struct MultiActorAggregator<'a> {
    graph: &'a ProgressionGraph,
}

impl<'a> MultiActorAggregator<'a> {
    pub fn new(graph: &'a ProgressionGraph) -> Self {
        Self { graph }
    }

    /// 有效等级：仅主玩家在开启经验等级且存在经验值时使用经验推导的等级
    pub fn effective_level(&self, snapshot: &ProgressSnapshot, primary: bool) -> u32 {
        if primary && snapshot.use_experience_level {
            if let Some(level) = snapshot
                .experience
                .and_then(|exp| self.graph.levels.level_for_experience(exp))
            {
                return level;
            }
        }
        snapshot.level
    }

    /// 解析单个角色（不走缓存）
    pub fn resolve_member(&self, member: &TeamMember) -> ActorAvailability {
        let level = self.effective_level(&member.snapshot, member.primary);
        AvailabilityResolver::new(&self.graph.tasks, member.snapshot.view(level)).resolve_all()
    }

    /// 聚合全部角色；提供缓存时按快照版本复用单角色结果
    pub fn aggregate(
        &self,
        members: &[TeamMember],
        mut cache: Option<&mut AvailabilityCache>,
    ) -> TeamAvailability {
        let per_actor: Vec<Arc<ActorAvailability>> = members
            .iter()
            .map(|m| match cache.as_deref_mut() {
                Some(cache) => {
                    let level = self.effective_level(&m.snapshot, m.primary);
                    cache
                        .resolve(self.graph, &m.actor_id, m.version, &m.snapshot, level)
                        .0
                }
                None => Arc::new(self.resolve_member(m)),
            })
            .collect();

        let mut out = TeamAvailability::default();

        for task in self.graph.tasks.tasks() {
            let mut row = HashMap::new();
            let mut any_available = false;
            let mut any_failed = false;
            let mut all_completed = true;
            let mut relevant = 0usize;

            for (member, availability) in members.iter().zip(&per_actor) {
                let available = availability.is_available(&task.id);
                row.insert(member.actor_id.clone(), available);

                if !task.is_faction_relevant(&member.snapshot.faction) {
                    continue;
                }
                relevant += 1;
                any_available |= available;

                match member.snapshot.task_state(&task.id) {
                    TaskState::Completed => {}
                    TaskState::Failed => {
                        any_failed = true;
                        all_completed = false;
                    }
                    TaskState::Uncompleted => all_completed = false,
                }
            }

            let state = if relevant == 0 {
                TaskState::Uncompleted
            } else if any_failed {
                TaskState::Failed
            } else if all_completed {
                TaskState::Completed
            } else {
                TaskState::Uncompleted
            };

            out.by_task.insert(task.id.clone(), row);
            out.available_for_any
                .insert(task.id.clone(), relevant > 0 && any_available);
            out.aggregate_state.insert(task.id.clone(), state);
        }

        for member in members {
            for (module_id, available) in HideoutResolver::resolve(&self.graph.hideout, &member.snapshot)
            {
                *out.hideout_available_for_any
                    .entry(module_id.clone())
                    .or_insert(false) |= available;
                out.hideout_by_module
                    .entry(module_id)
                    .or_default()
                    .insert(member.actor_id.clone(), available);
            }
        }

        out
    }
}
