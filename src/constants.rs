use core::time::Duration;

/// Every starter begins the journey at this level
pub const STARTER_LEVEL: u8 = 5;

/// The starters with their emoji
pub const STARTERS: &[(&str, &str)] = &[
    ("bulbasaur", "🌱"),
    ("charmander", "🔥"),
    ("squirtle", "💧"),
];

/// Wild pokemon come from the first generation
pub const OPPONENT_DEX_RANGE: (u16, u16) = (1, 151);
pub const OPPONENT_LEVEL_RANGE: (u8, u8) = (2, 6);

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PREFIX: &str = "pkm>";
