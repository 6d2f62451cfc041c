use rand::Rng;

pub type Damage = u16;

const MIN_DAMAGE_MODIFY: f32 = 0.85;

/// Types are not modeled, every move hits with the same power
pub const BASE_POWER: u16 = 40;

pub struct DamageStats {
    atk: u16,
    def: u16,
    level: u8,
    power: u16,
}

impl DamageStats {
    pub fn new(power: u16, atk: u16, def: u16, level: u8) -> Self {
        Self {
            power,
            atk: atk.max(1),
            def: def.max(1),
            level,
        }
    }

    // (((level * 2 / 5) + 2) * power * atk / def) / 50 + 2
    fn cal(&self) -> Damage {
        let level_dmg = (self.level as u32 * 2 / 5) + 2;
        let basic = level_dmg * self.power as u32 * self.atk as u32 / self.def as u32 / 50;
        (basic + 2).min(Damage::MAX as u32) as Damage
    }

    /// The damage range of a single hit, never lower than 1
    pub fn calculate(&self) -> (Damage, Damage) {
        let max_dmg = self.cal();
        let min_dmg = (max_dmg as f32 * MIN_DAMAGE_MODIFY) as Damage;
        (min_dmg.max(1), max_dmg)
    }

    /// Roll the damage of a hit within the range of [`calculate`](Self::calculate)
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Damage {
        let (min, max) = self.calculate();
        rng.gen_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn starter_damage_range() {
        let stats = DamageStats::new(BASE_POWER, 49, 49, 5);
        assert_eq!(stats.calculate(), (4, 5));
    }

    #[test]
    fn higher_level_hits_harder() {
        let stats = DamageStats::new(BASE_POWER, 49, 49, 50);
        assert_eq!(stats.calculate(), (16, 19));
    }

    #[test]
    fn zero_stats_are_clamped() {
        let stats = DamageStats::new(BASE_POWER, 0, 0, 1);
        let (min, max) = stats.calculate();
        assert!(min >= 1);
        assert!(min <= max);
    }

    #[test]
    fn roll_stays_in_range() {
        let stats = DamageStats::new(BASE_POWER, 65, 40, 7);
        let (min, max) = stats.calculate();
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..500 {
            let dmg = stats.roll(&mut rng);
            assert!(dmg >= min && dmg <= max);
        }
    }

    #[test]
    fn same_seed_same_rolls() {
        let stats = DamageStats::new(BASE_POWER, 52, 43, 6);
        let mut a = SmallRng::seed_from_u64(42);
        let mut b = SmallRng::seed_from_u64(42);

        let first: Vec<_> = (0..20).map(|_| stats.roll(&mut a)).collect();
        let second: Vec<_> = (0..20).map(|_| stats.roll(&mut b)).collect();
        assert_eq!(first, second);
    }
}
