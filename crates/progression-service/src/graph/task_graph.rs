use std::collections::HashMap;

use tracing::warn;

use crate::models::{RequirementStatus, Task, TaskId, TraderId};

/// 任务依赖图
///
/// 每次加载元数据时构建一次，此后只读
#[derive(Debug, Default, Clone)]
pub struct TaskGraph {
    tasks: HashMap<TaskId, Task>,
    /// 元数据中的任务顺序
    order: Vec<TaskId>,
    /// task_id -> 以 complete 状态依赖此任务的任务
    dependents: HashMap<TaskId, Vec<TaskId>>,
    /// trader_id -> 完成后解锁该商人的任务
    trader_unlocks: HashMap<TraderId, Vec<TaskId>>,
}

impl TaskGraph {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self::with_trader_unlocks(tasks, HashMap::new())
    }

    /// 构建任务图，`extra_unlocks` 与任务自带的 `traderUnlock` 合并
    pub fn with_trader_unlocks(
        tasks: Vec<Task>,
        extra_unlocks: HashMap<TraderId, Vec<TaskId>>,
    ) -> Self {
        let mut graph = Self::default();

        for task in tasks {
            if graph.tasks.contains_key(&task.id) {
                warn!(task_id = %task.id, "重复的任务 ID，保留首次出现的定义");
                continue;
            }

            for req in &task.task_requirements {
                if req.requires(RequirementStatus::Complete) {
                    let deps = graph.dependents.entry(req.task_id.clone()).or_default();
                    if !deps.contains(&task.id) {
                        deps.push(task.id.clone());
                    }
                }
            }

            if let Some(ref unlock) = task.trader_unlock {
                graph
                    .trader_unlocks
                    .entry(unlock.id.clone())
                    .or_default()
                    .push(task.id.clone());
            }

            graph.order.push(task.id.clone());
            graph.tasks.insert(task.id.clone(), task);
        }

        for (trader, ids) in extra_unlocks {
            let unlocks = graph.trader_unlocks.entry(trader).or_default();
            for id in ids {
                if !unlocks.contains(&id) {
                    unlocks.push(id);
                }
            }
        }

        graph
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// 按元数据顺序遍历任务
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 获取以 complete 状态依赖某任务的所有任务（用于级联）
    pub fn dependents_of(&self, id: &TaskId) -> &[TaskId] {
        self.dependents
            .get(id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// 获取解锁某商人的任务集合（可能包含图中不存在的 ID）
    pub fn trader_unlock_tasks(&self, trader: &TraderId) -> &[TaskId] {
        self.trader_unlocks
            .get(trader)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn alternatives_of(&self, id: &TaskId) -> &[TaskId] {
        self.tasks
            .get(id)
            .map(|t| t.alternatives.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequirementStatus::*;

    #[test]
    fn test_dependents_only_track_complete_requirements() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("a"),
            Task::new("b").requires("a", &[Complete]),
            Task::new("c").requires("a", &[Active]),
            Task::new("d").requires("a", &[Complete, Failed]),
        ]);

        assert_eq!(
            graph.dependents_of(&"a".into()),
            &[TaskId::from("b"), TaskId::from("d")]
        );
        assert!(graph.dependents_of(&"b".into()).is_empty());
    }

    #[test]
    fn test_duplicate_task_keeps_first() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("a").with_min_level(5),
            Task::new("a").with_min_level(30),
        ]);

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get(&"a".into()).unwrap().min_player_level, Some(5));
    }

    #[test]
    fn test_trader_unlocks_merge() {
        let mut extra = HashMap::new();
        extra.insert(TraderId::from("jaeger"), vec![TaskId::from("intro")]);

        let graph = TaskGraph::with_trader_unlocks(
            vec![
                Task::new("intro").unlocks_trader("jaeger"),
                Task::new("other").unlocks_trader("jaeger"),
            ],
            extra,
        );

        assert_eq!(
            graph.trader_unlock_tasks(&"jaeger".into()),
            &[TaskId::from("intro"), TaskId::from("other")]
        );
        assert!(graph.trader_unlock_tasks(&"prapor".into()).is_empty());
    }

    #[test]
    fn test_tasks_iterate_in_metadata_order() {
        let graph = TaskGraph::from_tasks(vec![Task::new("z"), Task::new("a"), Task::new("m")]);
        let ids: Vec<_> = graph.tasks().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
