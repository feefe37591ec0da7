//! 级联更新引擎
//!
//! 单个任务状态变化后，同步计算依赖任务与互斥任务的连锁变化。
//!
//! ## 规则
//!
//! - 写入新状态，状态发生迁移时记入批次
//! - 仅在发生迁移时传播：
//!   - 任务刚变为已完成：依赖它的任务若全部前置需求满足，重置为未完成（解锁）；
//!     互斥任务被强制标记为失败
//!   - 任务不再是已完成（含 failed -> uncompleted）：依赖它的任务强制重置为未完成
//!   - 任务变为未完成：互斥任务重置为未完成
//! - 所有写入使用事件时间戳，并清除 active 标记

use std::collections::HashMap;

use tracing::debug;

use super::dto::{CascadeOutcome, ChangeBatch, TaskStateChange};
use crate::graph::TaskGraph;
use crate::models::{Completion, TaskId, TaskState, state_of};
use crate::resolver::requirement_holds;

/// 纯函数形式的级联入口
pub fn cascade(
    graph: &TaskGraph,
    completions: &HashMap<TaskId, Completion>,
    event: &TaskStateChange,
) -> CascadeOutcome {
    cascade_many(graph, completions, std::slice::from_ref(event))
}

/// 依次应用多个事件，合并为同一批次
pub fn cascade_many(
    graph: &TaskGraph,
    completions: &HashMap<TaskId, Completion>,
    events: &[TaskStateChange],
) -> CascadeOutcome {
    let mut completions = completions.clone();
    let mut changes = ChangeBatch::default();

    for event in events {
        apply_event(graph, &mut completions, &mut changes, event);
    }

    CascadeOutcome {
        completions,
        changes,
    }
}

/// 持有任务图的级联引擎
pub struct CascadeEngine<'a> {
    graph: &'a TaskGraph,
}

impl<'a> CascadeEngine<'a> {
    pub fn new(graph: &'a TaskGraph) -> Self {
        Self { graph }
    }

    pub fn apply(
        &self,
        completions: &HashMap<TaskId, Completion>,
        event: &TaskStateChange,
    ) -> CascadeOutcome {
        cascade(self.graph, completions, event)
    }

    pub fn apply_many(
        &self,
        completions: &HashMap<TaskId, Completion>,
        events: &[TaskStateChange],
    ) -> CascadeOutcome {
        cascade_many(self.graph, completions, events)
    }
}

fn apply_event(
    graph: &TaskGraph,
    completions: &mut HashMap<TaskId, Completion>,
    changes: &mut ChangeBatch,
    event: &TaskStateChange,
) {
    let id = &event.task_id;
    let ts = event.timestamp;
    let old = completions.get(id).copied().unwrap_or_default();
    let new = event.completion();
    let prev = old.state();
    let next = new.state();

    write(completions, changes, id, new);

    if prev == next {
        return;
    }

    let now_completed = next == TaskState::Completed;
    // failed -> uncompleted 同样清除了 complete 标记
    let no_longer_completed =
        prev == TaskState::Completed || (old.complete && !new.complete);

    for dep_id in graph.dependents_of(id) {
        if dep_id == id {
            continue;
        }
        if now_completed {
            let Some(dep) = graph.get(dep_id) else {
                continue;
            };
            let unlocked = dep
                .task_requirements
                .iter()
                .all(|req| requirement_holds(req, graph, completions));
            if unlocked {
                write(completions, changes, dep_id, TaskState::Uncompleted.target(ts));
            }
        } else if no_longer_completed {
            write(completions, changes, dep_id, TaskState::Uncompleted.target(ts));
        }
    }

    for alt_id in graph.alternatives_of(id) {
        if alt_id == id || !graph.contains(alt_id) {
            continue;
        }
        if now_completed {
            write(completions, changes, alt_id, TaskState::Failed.target(ts));
        } else if next == TaskState::Uncompleted {
            write(completions, changes, alt_id, TaskState::Uncompleted.target(ts));
        }
    }

    debug!(
        task_id = %id,
        from = %prev,
        to = %next,
        dependents = graph.dependents_of(id).len(),
        "级联完成"
    );
}

/// 写入完成记录，状态发生迁移时记入批次
fn write(
    completions: &mut HashMap<TaskId, Completion>,
    changes: &mut ChangeBatch,
    id: &TaskId,
    record: Completion,
) {
    let prev = state_of(completions, id);
    let next = record.state();
    completions.insert(id.clone(), record);
    if prev != next {
        changes.record_task(id, next);
    }
}
