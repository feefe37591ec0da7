//! 前置需求匹配规则
//!
//! 可用性解析与级联更新共用同一套规则

use std::collections::HashMap;

use crate::graph::TaskGraph;
use crate::models::{Completion, FailedRequirement, RequirementStatus, TaskId, TaskRequirement};

/// 单个前置需求的匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementOutcome {
    Satisfied,
    Unsatisfied,
    /// 仅能通过 `active` 状态满足，取决于前置任务是否可解锁
    NeedsUnlockable(TaskId),
}

/// 按共享规则匹配前置需求
///
/// - 前置任务不在图中：满足
/// - 状态列表为空：满足
/// - complete：前置任务为 `{complete: true, failed: false}`
/// - failed：前置任务已失败
/// - active：前置任务已完成或带有显式 active 标记，否则取决于其可解锁性
pub fn requirement_outcome(
    req: &TaskRequirement,
    graph: &TaskGraph,
    completions: &HashMap<TaskId, Completion>,
) -> RequirementOutcome {
    if !graph.contains(&req.task_id) || req.status.is_empty() {
        return RequirementOutcome::Satisfied;
    }

    let record = completions.get(&req.task_id).copied().unwrap_or_default();
    let mut needs_unlockable = false;

    for status in &req.status {
        match status {
            RequirementStatus::Complete if record.is_completed() => {
                return RequirementOutcome::Satisfied;
            }
            RequirementStatus::Failed if record.is_failed() => {
                return RequirementOutcome::Satisfied;
            }
            RequirementStatus::Active => {
                if record.is_completed() || record.active {
                    return RequirementOutcome::Satisfied;
                }
                needs_unlockable = true;
            }
            _ => {}
        }
    }

    if needs_unlockable {
        RequirementOutcome::NeedsUnlockable(req.task_id.clone())
    } else {
        RequirementOutcome::Unsatisfied
    }
}

/// 级联路径的判定：不调用解析器，仅凭完成记录
pub fn requirement_holds(
    req: &TaskRequirement,
    graph: &TaskGraph,
    completions: &HashMap<TaskId, Completion>,
) -> bool {
    requirement_outcome(req, graph, completions) == RequirementOutcome::Satisfied
}

/// 任一失败触发任务已失败时，任务被阻断
pub fn failed_requirement_blocks(
    failed: &[FailedRequirement],
    completions: &HashMap<TaskId, Completion>,
) -> bool {
    failed.iter().any(|f| {
        completions
            .get(&f.task_id)
            .is_some_and(Completion::is_failed)
    })
}
