/// XP required to advance one level. Levels are a flat 100 XP each.
pub const XP_PER_LEVEL: u64 = 100;

/// Level standing derived from total XP. Pure function of the XP counter,
/// recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelInfo {
    pub level: u64,
    pub current_xp: u64,
    pub next_level_xp: u64,
    pub progress_pct: f64,
}

impl LevelInfo {
    /// Computes the level standing for a total XP count.
    ///
    /// `level` starts at 1, `current_xp` is the remainder within the level
    /// and `progress_pct` is how far through the level the learner is.
    #[must_use]
    pub fn for_xp(total_xp: u64) -> Self {
        let level = total_xp / XP_PER_LEVEL + 1;
        let current_xp = total_xp % XP_PER_LEVEL;
        let next_level_xp = XP_PER_LEVEL;
        #[allow(clippy::cast_precision_loss)]
        let progress_pct = current_xp as f64 / next_level_xp as f64 * 100.0;
        Self {
            level,
            current_xp,
            next_level_xp,
            progress_pct,
        }
    }

    /// XP still needed to reach the next level.
    #[must_use]
    pub fn xp_to_next_level(&self) -> u64 {
        self.next_level_xp - self.current_xp
    }
}
