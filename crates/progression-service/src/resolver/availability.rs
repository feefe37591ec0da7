use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::matching::{RequirementOutcome, failed_requirement_blocks, requirement_outcome};
use crate::gates::GateEvaluator;
use crate::graph::TaskGraph;
use crate::models::{ActorView, TaskId};

/// 解析模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// 可接取：任务本身已完成时为 false
    Available,
    /// 可解锁：忽略任务本身的完成状态
    Unlockable,
}

/// 单个角色的解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActorAvailability {
    pub available: HashMap<TaskId, bool>,
    pub unlockable: HashMap<TaskId, bool>,
}

impl ActorAvailability {
    pub fn is_available(&self, id: &TaskId) -> bool {
        self.available.get(id).copied().unwrap_or(false)
    }

    pub fn is_unlockable(&self, id: &TaskId) -> bool {
        self.unlockable.get(id).copied().unwrap_or(false)
    }

    pub fn available_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.available
            .iter()
            .filter_map(|(id, ok)| ok.then_some(id))
    }
}

type Key = (TaskId, ResolveMode);

/// 打开一个节点的结果：直接得出结论，或需要等待若干前置任务的可解锁性
enum Opened {
    Done(bool),
    Pending(Vec<TaskId>),
}

struct Frame {
    key: Key,
    pending: Vec<TaskId>,
    next: usize,
}

/// 单个角色的可用性解析器
///
/// 备忘表按 `(TaskId, ResolveMode)` 存储，生命周期为一次解析。
/// 遍历使用显式栈，环上的回边记为 false
pub struct AvailabilityResolver<'a> {
    graph: &'a TaskGraph,
    actor: ActorView<'a>,
    memo: HashMap<Key, bool>,
}

impl<'a> AvailabilityResolver<'a> {
    pub fn new(graph: &'a TaskGraph, actor: ActorView<'a>) -> Self {
        Self {
            graph,
            actor,
            memo: HashMap::new(),
        }
    }

    pub fn available(&mut self, id: &TaskId) -> bool {
        self.evaluate((id.clone(), ResolveMode::Available))
    }

    pub fn unlockable(&mut self, id: &TaskId) -> bool {
        self.evaluate((id.clone(), ResolveMode::Unlockable))
    }

    /// 解析图中全部任务
    pub fn resolve_all(mut self) -> ActorAvailability {
        let graph = self.graph;
        let mut result = ActorAvailability::default();

        for task in graph.tasks() {
            let available = self.available(&task.id);
            let unlockable = self.unlockable(&task.id);
            result.available.insert(task.id.clone(), available);
            result.unlockable.insert(task.id.clone(), unlockable);
        }

        result
    }

    fn evaluate(&mut self, root: Key) -> bool {
        if let Some(&value) = self.memo.get(&root) {
            return value;
        }

        let mut visiting: HashSet<Key> = HashSet::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut returned: Option<bool> = None;

        match self.open(&root) {
            Opened::Done(value) => {
                self.memo.insert(root, value);
                return value;
            }
            Opened::Pending(pending) => {
                visiting.insert(root.clone());
                stack.push(Frame {
                    key: root,
                    pending,
                    next: 0,
                });
            }
        }

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };

            let mut finished = None;
            match returned.take() {
                Some(false) => finished = Some(false),
                Some(true) => frame.next += 1,
                None => {}
            }

            if finished.is_none() {
                if frame.next >= frame.pending.len() {
                    finished = Some(true);
                } else {
                    let dep = (frame.pending[frame.next].clone(), ResolveMode::Unlockable);
                    if let Some(&value) = self.memo.get(&dep) {
                        returned = Some(value);
                        continue;
                    }
                    if visiting.contains(&dep) {
                        returned = Some(false);
                        continue;
                    }
                    match self.open(&dep) {
                        Opened::Done(value) => {
                            self.memo.insert(dep, value);
                            returned = Some(value);
                        }
                        Opened::Pending(pending) => {
                            visiting.insert(dep.clone());
                            stack.push(Frame {
                                key: dep,
                                pending,
                                next: 0,
                            });
                        }
                    }
                    continue;
                }
            }

            if let (Some(value), Some(done)) = (finished, stack.pop()) {
                visiting.remove(&done.key);
                self.memo.insert(done.key, value);
                returned = Some(value);
            }
        }

        returned.unwrap_or(false)
    }

    /// 检查顺序：自身完成（仅 Available）、失败触发、门槛、前置需求
    fn open(&self, key: &Key) -> Opened {
        let (id, mode) = key;
        let Some(task) = self.graph.get(id) else {
            return Opened::Done(false);
        };
        let completions = self.actor.completions;

        if *mode == ResolveMode::Available && completions.get(id).is_some_and(|c| c.complete) {
            return Opened::Done(false);
        }

        if failed_requirement_blocks(&task.failed_requirements, completions) {
            return Opened::Done(false);
        }

        if GateEvaluator::evaluate_all(task, self.graph, &self.actor).is_err() {
            return Opened::Done(false);
        }

        let mut pending = Vec::new();
        for req in &task.task_requirements {
            match requirement_outcome(req, self.graph, completions) {
                RequirementOutcome::Satisfied => {}
                RequirementOutcome::Unsatisfied => return Opened::Done(false),
                RequirementOutcome::NeedsUnlockable(dep) => pending.push(dep),
            }
        }

        if pending.is_empty() {
            Opened::Done(true)
        } else {
            Opened::Pending(pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgressSnapshot, RequirementStatus::*, Task, TaskState};

    fn resolve(graph: &TaskGraph, snapshot: &ProgressSnapshot) -> ActorAvailability {
        AvailabilityResolver::new(graph, snapshot.view(snapshot.level)).resolve_all()
    }

    #[test]
    fn test_simple_chain() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("a"),
            Task::new("b").requires("a", &[Complete]),
        ]);

        let fresh = resolve(&graph, &ProgressSnapshot::default());
        assert!(fresh.is_available(&"a".into()));
        assert!(!fresh.is_available(&"b".into()));

        let done = resolve(
            &graph,
            &ProgressSnapshot::default().with_state("a", TaskState::Completed),
        );
        assert!(!done.is_available(&"a".into()));
        assert!(done.is_unlockable(&"a".into()));
        assert!(done.is_available(&"b".into()));
    }

    #[test]
    fn test_failed_by_exclusion_is_not_available() {
        let graph = TaskGraph::from_tasks(vec![Task::new("a")]);
        let snapshot = ProgressSnapshot::default().with_state("a", TaskState::Failed);
        let result = resolve(&graph, &snapshot);
        assert!(!result.is_available(&"a".into()));
        assert!(result.is_unlockable(&"a".into()));
    }

    #[test]
    fn test_failed_requirement_blocks_task() {
        let graph = TaskGraph::from_tasks(vec![Task::new("x"), Task::new("t").fails_if("x")]);

        let result = resolve(
            &graph,
            &ProgressSnapshot::default().with_state("x", TaskState::Failed),
        );
        assert!(!result.is_available(&"t".into()));

        let result = resolve(
            &graph,
            &ProgressSnapshot::default().with_state("x", TaskState::Completed),
        );
        assert!(result.is_available(&"t".into()));
    }

    #[test]
    fn test_active_requirement_uses_unlockable() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("a").with_min_level(10),
            Task::new("b").requires("a", &[Active]),
        ]);

        let low = resolve(&graph, &ProgressSnapshot::default().with_level(5));
        assert!(!low.is_available(&"b".into()));

        let high = resolve(&graph, &ProgressSnapshot::default().with_level(10));
        assert!(high.is_available(&"a".into()));
        assert!(high.is_available(&"b".into()));
    }

    #[test]
    fn test_cycle_members_resolve_false() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("a").requires("b", &[Active]),
            Task::new("b").requires("a", &[Active]),
            Task::new("c").requires("c", &[Active]),
        ]);

        let result = resolve(&graph, &ProgressSnapshot::default());
        assert!(!result.is_available(&"a".into()));
        assert!(!result.is_available(&"b".into()));
        assert!(!result.is_available(&"c".into()));
    }

    #[test]
    fn test_deep_active_chain_does_not_overflow() {
        let depth = 100_000;
        let mut tasks = vec![Task::new("t0")];
        for i in 1..depth {
            tasks.push(Task::new(format!("t{}", i)).requires(format!("t{}", i - 1), &[Active]));
        }
        let graph = TaskGraph::from_tasks(tasks);
        let snapshot = ProgressSnapshot::default();

        let mut resolver = AvailabilityResolver::new(&graph, snapshot.view(1));
        assert!(resolver.available(&TaskId::from(format!("t{}", depth - 1))));
    }

    #[test]
    fn test_unknown_requirement_is_satisfied() {
        let graph = TaskGraph::from_tasks(vec![Task::new("t").requires("ghost", &[Complete])]);
        let result = resolve(&graph, &ProgressSnapshot::default());
        assert!(result.is_available(&"t".into()));
    }

    #[test]
    fn test_gate_blocks_availability() {
        let graph = TaskGraph::from_tasks(vec![Task::new("t").with_faction("BEAR")]);
        let usec = ProgressSnapshot::default().with_faction("USEC");
        assert!(!resolve(&graph, &usec).is_available(&"t".into()));
    }
}
