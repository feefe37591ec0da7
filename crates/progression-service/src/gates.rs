//! 任务门槛判定
//!
//! 每种门槛一个纯函数：等级、阵营、商人声望、商人解锁

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::TaskGraph;
use crate::models::{ActorView, Completion, Task, TaskId, TraderId};

/// 首个未通过的门槛
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateFailure {
    Level { required: u32, actual: u32 },
    Faction { required: String, actual: String },
    Reputation { trader_id: TraderId, threshold: i32, actual: f64 },
    TraderLocked { trader_id: TraderId },
}

/// 门槛判定器
pub struct GateEvaluator;

impl GateEvaluator {
    pub fn level_gate(task: &Task, actor_level: u32) -> bool {
        task.min_player_level
            .map(|min| actor_level >= min)
            .unwrap_or(true)
    }

    pub fn faction_gate(task: &Task, actor_faction: &str) -> bool {
        task.is_faction_relevant(actor_faction)
    }

    /// 阈值 >= 0 要求声望不低于阈值，负阈值要求声望不高于阈值
    pub fn reputation_gate(task: &Task, reputation: &HashMap<TraderId, f64>) -> bool {
        Self::first_reputation_failure(task, reputation).is_none()
    }

    /// 任务的商人存在已知解锁任务时，至少其中一个必须已完成
    pub fn trader_unlock_gate(
        task: &Task,
        graph: &TaskGraph,
        completions: &HashMap<TaskId, Completion>,
    ) -> bool {
        let Some(ref trader) = task.trader else {
            return true;
        };

        let mut unlocks = graph
            .trader_unlock_tasks(&trader.id)
            .iter()
            .filter(|id| **id != task.id && graph.contains(id))
            .peekable();

        if unlocks.peek().is_none() {
            return true;
        }

        unlocks.any(|id| completions.get(id).is_some_and(Completion::is_completed))
    }

    /// 依次检查全部门槛，返回首个失败项
    pub fn evaluate_all(
        task: &Task,
        graph: &TaskGraph,
        actor: &ActorView<'_>,
    ) -> Result<(), GateFailure> {
        if !Self::level_gate(task, actor.level) {
            return Err(GateFailure::Level {
                required: task.min_player_level.unwrap_or_default(),
                actual: actor.level,
            });
        }

        if !Self::faction_gate(task, actor.faction) {
            return Err(GateFailure::Faction {
                required: task.faction_name.clone(),
                actual: actor.faction.to_string(),
            });
        }

        if let Some(failure) = Self::first_reputation_failure(task, actor.reputation) {
            return Err(failure);
        }

        if !Self::trader_unlock_gate(task, graph, actor.completions) {
            let trader_id = task
                .trader
                .as_ref()
                .map(|t| t.id.clone())
                .unwrap_or_else(|| TraderId::from(""));
            return Err(GateFailure::TraderLocked { trader_id });
        }

        Ok(())
    }

    fn first_reputation_failure(
        task: &Task,
        reputation: &HashMap<TraderId, f64>,
    ) -> Option<GateFailure> {
        task.trader_requirements.iter().find_map(|req| {
            let actual = reputation.get(&req.trader_id).copied().unwrap_or(0.0);
            let threshold = f64::from(req.value);
            let passed = if req.value >= 0 {
                actual >= threshold
            } else {
                actual <= threshold
            };

            (!passed).then(|| GateFailure::Reputation {
                trader_id: req.trader_id.clone(),
                threshold: req.value,
                actual,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressSnapshot, TaskState};

    #[test]
    fn test_level_gate() {
        let task = Task::new("t").with_min_level(10);
        assert!(!GateEvaluator::level_gate(&task, 9));
        assert!(GateEvaluator::level_gate(&task, 10));
        assert!(GateEvaluator::level_gate(&Task::new("free"), 1));
    }

    #[test]
    fn test_faction_gate() {
        let task = Task::new("t").with_faction("BEAR");
        assert!(GateEvaluator::faction_gate(&task, "BEAR"));
        assert!(!GateEvaluator::faction_gate(&task, "USEC"));
        assert!(GateEvaluator::faction_gate(&Task::new("any"), "USEC"));
    }

    #[test]
    fn test_reputation_gate_thresholds() {
        let at_least = Task::new("t").with_reputation("prapor", 1);
        let at_most = Task::new("t").with_reputation("fence", -1);

        let mut rep = HashMap::new();
        assert!(!GateEvaluator::reputation_gate(&at_least, &rep));
        // 缺失的声望按 0 计算
        assert!(!GateEvaluator::reputation_gate(&at_most, &rep));

        rep.insert(TraderId::from("prapor"), 1.0);
        rep.insert(TraderId::from("fence"), -2.5);
        assert!(GateEvaluator::reputation_gate(&at_least, &rep));
        assert!(GateEvaluator::reputation_gate(&at_most, &rep));
    }

    #[test]
    fn test_trader_unlock_gate() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("intro").with_trader("prapor").unlocks_trader("jaeger"),
            Task::new("hunt").with_trader("jaeger"),
            Task::new("plain").with_trader("prapor"),
        ]);
        let hunt = graph.get(&"hunt".into()).unwrap();
        let plain = graph.get(&"plain".into()).unwrap();

        let locked = ProgressSnapshot::default();
        assert!(!GateEvaluator::trader_unlock_gate(hunt, &graph, &locked.completions));
        assert!(GateEvaluator::trader_unlock_gate(plain, &graph, &locked.completions));

        let unlocked = ProgressSnapshot::default().with_state("intro", TaskState::Completed);
        assert!(GateEvaluator::trader_unlock_gate(hunt, &graph, &unlocked.completions));

        let failed = ProgressSnapshot::default().with_state("intro", TaskState::Failed);
        assert!(!GateEvaluator::trader_unlock_gate(hunt, &graph, &failed.completions));
    }

    #[test]
    fn test_trader_unlock_ignores_self_and_unknown() {
        let mut extra = HashMap::new();
        extra.insert(
            TraderId::from("jaeger"),
            vec![TaskId::from("ghost"), TaskId::from("intro")],
        );
        let graph = TaskGraph::with_trader_unlocks(
            vec![Task::new("intro").with_trader("jaeger").unlocks_trader("jaeger")],
            extra,
        );
        let intro = graph.get(&"intro".into()).unwrap();

        assert!(GateEvaluator::trader_unlock_gate(
            intro,
            &graph,
            &HashMap::new()
        ));
    }

    #[test]
    fn test_evaluate_all_reports_first_failure() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("t")
                .with_min_level(20)
                .with_faction("USEC")
                .with_reputation("skier", 2),
        ]);
        let task = graph.get(&"t".into()).unwrap();

        let snapshot = ProgressSnapshot::default().with_faction("BEAR");
        assert_eq!(
            GateEvaluator::evaluate_all(task, &graph, &snapshot.view(5)),
            Err(GateFailure::Level {
                required: 20,
                actual: 5
            })
        );
        assert!(matches!(
            GateEvaluator::evaluate_all(task, &graph, &snapshot.view(25)),
            Err(GateFailure::Faction { .. })
        ));

        let usec = ProgressSnapshot::default()
            .with_faction("USEC")
            .with_reputation("skier", 2.0);
        assert_eq!(
            GateEvaluator::evaluate_all(task, &graph, &usec.view(25)),
            Ok(())
        );
    }
}
