//! Turning ranked candidates into display records.
//!
//! Two passes: [`PartialRecord::from_row`] copies what the row provides, then
//! [`fill_fallbacks`] draws every remaining optional field from a fixed pool.

pub mod fallback;
pub mod parse;
pub mod record;

#[cfg(test)]
mod tests;

pub use fallback::fill_fallbacks;
pub use parse::{list_cell, parse_experience, parse_list};
pub use record::{DEFAULT_LOCATION, DisplayRecord, PartialRecord};

use rand::Rng;

use crate::cache::{RankedScores, ScoredEntity};
use crate::table::EntityRow;

/// Builds the display record for one scored entity.
pub fn materialize<R: Rng + ?Sized>(
    entity_id: &str,
    row: &EntityRow,
    score: f64,
    rng: &mut R,
) -> DisplayRecord {
    fill_fallbacks(PartialRecord::from_row(entity_id, row, score), rng)
}

/// Materializes `picks` against the ranking they were selected from.
///
/// Each entity displays its first row in the table. A pick whose id has no row
/// materializes from an empty row, so every field comes from the fallbacks.
pub fn materialize_all<R: Rng + ?Sized>(
    ranked: &RankedScores,
    picks: &[ScoredEntity],
    rng: &mut R,
) -> Vec<DisplayRecord> {
    let empty = EntityRow::new();
    picks
        .iter()
        .map(|pick| {
            let row = ranked.display_row(&pick.entity_id).unwrap_or(&empty);
            materialize(&pick.entity_id, row, pick.score, rng)
        })
        .collect()
}
