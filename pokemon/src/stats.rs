/// The stats of a pokemon once it enters a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleStats {
    pub max_hp: u16,
}

/// HP gained on every level, on top of the base stat
pub const HP_PER_LEVEL: u16 = 5;

/// ``Base + Level * 5``
pub fn derive_stats(base_hp: u16, level: u8) -> BattleStats {
    let bonus = level as u16 * HP_PER_LEVEL;

    BattleStats {
        max_hp: base_hp.saturating_add(bonus),
    }
}
