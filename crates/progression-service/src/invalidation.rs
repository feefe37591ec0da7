//! 进度一致性检查
//!
//! 只读扫描，找出按图规则不可能出现的完成状态

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::graph::TaskGraph;
use crate::models::{Completion, RequirementStatus, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Invalidation {
    /// 互斥任务同时处于已完成状态
    AlternativeConflict { task_id: TaskId, alternative_id: TaskId },
    /// 任务已完成，但 complete 类型的前置任务未完成
    RequirementNotMet { task_id: TaskId, requirement_id: TaskId },
    /// 任务已完成，但失败触发任务已失败
    FailedRequirementViolated { task_id: TaskId, failed_id: TaskId },
}

pub struct InvalidationDetector;

impl InvalidationDetector {
    pub fn scan(graph: &TaskGraph, completions: &HashMap<TaskId, Completion>) -> Vec<Invalidation> {
        let is_completed =
            |id: &TaskId| completions.get(id).is_some_and(Completion::is_completed);
        let mut findings = Vec::new();
        let mut reported_pairs: HashSet<(TaskId, TaskId)> = HashSet::new();

        for task in graph.tasks() {
            if !is_completed(&task.id) {
                continue;
            }

            for alt in &task.alternatives {
                if alt == &task.id || !graph.contains(alt) || !is_completed(alt) {
                    continue;
                }
                let pair = if task.id < *alt {
                    (task.id.clone(), alt.clone())
                } else {
                    (alt.clone(), task.id.clone())
                };
                if reported_pairs.insert(pair) {
                    findings.push(Invalidation::AlternativeConflict {
                        task_id: task.id.clone(),
                        alternative_id: alt.clone(),
                    });
                }
            }

            for req in &task.task_requirements {
                let complete_only = req.status == [RequirementStatus::Complete];
                if complete_only && graph.contains(&req.task_id) && !is_completed(&req.task_id) {
                    findings.push(Invalidation::RequirementNotMet {
                        task_id: task.id.clone(),
                        requirement_id: req.task_id.clone(),
                    });
                }
            }

            for failed in &task.failed_requirements {
                if completions
                    .get(&failed.task_id)
                    .is_some_and(Completion::is_failed)
                {
                    findings.push(Invalidation::FailedRequirementViolated {
                        task_id: task.id.clone(),
                        failed_id: failed.task_id.clone(),
                    });
                }
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressSnapshot, RequirementStatus::*, Task, TaskState};

    #[test]
    fn test_consistent_progress_has_no_findings() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("a").with_alternative("b"),
            Task::new("b").with_alternative("a"),
            Task::new("c").requires("a", &[Complete]),
        ]);
        let snapshot = ProgressSnapshot::default()
            .with_state("a", TaskState::Completed)
            .with_state("b", TaskState::Failed)
            .with_state("c", TaskState::Completed);

        assert!(InvalidationDetector::scan(&graph, &snapshot.completions).is_empty());
    }

    #[test]
    fn test_alternative_conflict_reported_once() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("a").with_alternative("b"),
            Task::new("b").with_alternative("a"),
        ]);
        let snapshot = ProgressSnapshot::default()
            .with_state("a", TaskState::Completed)
            .with_state("b", TaskState::Completed);

        let findings = InvalidationDetector::scan(&graph, &snapshot.completions);
        assert_eq!(
            findings,
            vec![Invalidation::AlternativeConflict {
                task_id: "a".into(),
                alternative_id: "b".into(),
            }]
        );
    }

    #[test]
    fn test_requirement_and_failed_violations() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("a"),
            Task::new("x"),
            Task::new("c").requires("a", &[Complete]).fails_if("x"),
            Task::new("lenient").requires("a", &[Complete, Active]),
        ]);
        let snapshot = ProgressSnapshot::default()
            .with_state("x", TaskState::Failed)
            .with_state("c", TaskState::Completed)
            .with_state("lenient", TaskState::Completed);

        let findings = InvalidationDetector::scan(&graph, &snapshot.completions);
        assert_eq!(findings.len(), 2);
        assert!(findings.contains(&Invalidation::RequirementNotMet {
            task_id: "c".into(),
            requirement_id: "a".into(),
        }));
        assert!(findings.contains(&Invalidation::FailedRequirementViolated {
            task_id: "c".into(),
            failed_id: "x".into(),
        }));
    }
}
