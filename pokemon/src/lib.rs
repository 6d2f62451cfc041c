pub mod damage;
pub mod moves;
pub mod stats;

pub use damage::{Damage, DamageStats, BASE_POWER};
pub use moves::{select_moves, LearnsetEntry, DEFAULT_MOVE, MAX_MOVES};
pub use stats::{derive_stats, BattleStats};
