pub mod display;
pub mod history;
pub mod notation;
pub mod roller;

pub use history::{HistoryEntry, HistoryError, HistoryLimit, HistoryStore};
pub use notation::{NotationError, RollSpec, parse};
pub use roller::{Dice, DieSource, RollOutcome, Roller, ScriptedDice};

/// Parse `text` and roll it with `roller`.
///
/// The outcome keeps `text` exactly as given so history shows what the user
/// typed.
pub fn roll_notation<S: DieSource>(
    roller: &mut Roller<S>,
    text: &str,
) -> Result<RollOutcome, NotationError> {
    let spec = parse(text)?;
    Ok(roller.roll(spec, text))
}
