use crate::models::PlayerLevel;

/// 玩家等级表
#[derive(Debug, Default, Clone)]
pub struct LevelTable {
    /// 按所需经验升序
    rows: Vec<PlayerLevel>,
}

impl LevelTable {
    pub fn new(mut rows: Vec<PlayerLevel>) -> Self {
        rows.sort_by_key(|r| (r.exp, r.level));
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 累计经验对应的等级；等级表为空时返回 None
    pub fn level_for_experience(&self, exp: u64) -> Option<u32> {
        let reached = self.rows.iter().take_while(|r| r.exp <= exp).last();
        match reached {
            Some(row) => Some(row.level),
            None => self.rows.first().map(|r| r.level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LevelTable {
        LevelTable::new(vec![
            PlayerLevel { level: 3, exp: 3000 },
            PlayerLevel { level: 1, exp: 0 },
            PlayerLevel { level: 2, exp: 1000 },
        ])
    }

    #[test]
    fn test_level_for_experience() {
        let table = table();
        assert_eq!(table.level_for_experience(0), Some(1));
        assert_eq!(table.level_for_experience(999), Some(1));
        assert_eq!(table.level_for_experience(1000), Some(2));
        assert_eq!(table.level_for_experience(50_000), Some(3));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(LevelTable::default().level_for_experience(10), None);
    }
}
