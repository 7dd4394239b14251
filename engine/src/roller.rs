use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::notation::RollSpec;

/// Something that can roll a single die.
///
/// Implementations must return a value in `1..=sides`.
pub trait DieSource {
    fn draw(&mut self, sides: u32) -> u32;
}

/// Scripted draws: `|sides| ...` closures work as a source.
impl<F: FnMut(u32) -> u32> DieSource for F {
    fn draw(&mut self, sides: u32) -> u32 {
        self(sides)
    }
}

/// ChaCha8-backed dice.
pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl DieSource for Dice {
    fn draw(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides)
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    draws: Vec<u32>,
    next: usize,
}

impl ScriptedDice {
    /// # Panics
    ///
    /// Panics if `draws` is empty.
    pub fn new(draws: impl IntoIterator<Item = u32>) -> Self {
        let draws: Vec<u32> = draws.into_iter().collect();
        assert!(!draws.is_empty(), "scripted dice need at least one draw");
        Self { draws, next: 0 }
    }
}

impl DieSource for ScriptedDice {
    fn draw(&mut self, sides: u32) -> u32 {
        let value = self.draws[self.next % self.draws.len()];
        self.next += 1;
        debug_assert!(
            (1..=sides).contains(&value),
            "scripted draw {value} does not fit a d{sides}"
        );
        value
    }
}

/// The realized result of one roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub spec: RollSpec,
    /// Individual die results, in draw order.
    pub rolls: Vec<u32>,
    pub total: i64,
    /// The notation as the user typed it.
    pub command: String,
}

impl RollOutcome {
    /// Sum of the dice before the modifier is applied.
    pub fn dice_sum(&self) -> i64 {
        self.rolls.iter().map(|&r| i64::from(r)).sum()
    }
}

pub struct Roller<S: DieSource> {
    source: S,
}

impl<S: DieSource> Roller<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Roll `spec.count()` dice and add the modifier.
    pub fn roll(&mut self, spec: RollSpec, command: &str) -> RollOutcome {
        let rolls: Vec<u32> = (0..spec.count())
            .map(|_| self.source.draw(spec.sides()))
            .collect();
        let total = rolls.iter().map(|&r| i64::from(r)).sum::<i64>() + spec.modifier();
        tracing::debug!(%spec, ?rolls, total, "rolled");
        RollOutcome {
            spec,
            rolls,
            total,
            command: command.to_string(),
        }
    }
}
