//! 进度图模型
//!
//! 任务图、藏身处模块图与等级表。从元数据目录加载后不可变，
//! 每次加载分配递增的 `generation`，用于让可用性缓存失效

mod hideout_graph;
mod levels;
mod task_graph;

pub use hideout_graph::HideoutGraph;
pub use levels::LevelTable;
pub use task_graph::TaskGraph;

use crate::metadata::GraphCatalog;

#[derive(Debug, Default, Clone)]
pub struct ProgressionGraph {
    pub tasks: TaskGraph,
    pub hideout: HideoutGraph,
    pub levels: LevelTable,
    pub generation: u64,
}

impl ProgressionGraph {
    pub fn from_catalog(catalog: GraphCatalog, generation: u64) -> Self {
        Self {
            tasks: TaskGraph::with_trader_unlocks(catalog.tasks, catalog.trader_unlocks),
            hideout: HideoutGraph::from_modules(catalog.hideout_modules),
            levels: LevelTable::new(catalog.player_levels),
            generation,
        }
    }

    /// 仅含任务的图，便于测试与基准
    pub fn from_tasks(tasks: Vec<crate::models::Task>) -> Self {
        Self {
            tasks: TaskGraph::from_tasks(tasks),
            ..Self::default()
        }
    }
}
