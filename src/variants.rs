//! The built-in variant table.
//!
//! Game variants are compiled into the server; storage backends record only
//! the variant id with each finished game, and history projections are
//! enriched with the display name before delivery.

use crate::protocol::GameHistoryEntry;

/// Variant ids recorded by the game engine. Ids are stable across releases;
/// never reuse a retired id.
const VARIANT_NAMES: &[(i32, &str)] = &[
    (0, "Standard"),
    (1, "Six Suits"),
    (2, "Four Suits"),
    (3, "Rainbow"),
    (4, "Black Suits"),
    (5, "Rainbow & Black"),
    (6, "Wild Cards"),
    (7, "Up or Down"),
];

/// Display name for a variant id, if the id is known.
pub fn variant_name(variant_id: i32) -> Option<&'static str> {
    VARIANT_NAMES
        .iter()
        .find(|(id, _)| *id == variant_id)
        .map(|(_, name)| *name)
}

/// Resolve variant display names in-place for a history projection.
/// Unknown ids are labeled rather than dropped so the entry still renders.
pub fn fill_variant_names(entries: &mut [GameHistoryEntry]) {
    for entry in entries {
        entry.variant_name = Some(
            variant_name(entry.variant_id)
                .map_or_else(|| format!("Unknown Variant ({})", entry.variant_id), String::from),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_variant_name_known_and_unknown() {
        assert_eq!(variant_name(0), Some("Standard"));
        assert_eq!(variant_name(9999), None);
    }

    #[test]
    fn test_fill_variant_names_labels_unknown_ids() {
        let mut entries = vec![
            GameHistoryEntry {
                game_id: 1,
                num_players: 3,
                score: 21,
                variant_id: 3,
                variant_name: None,
                played_at: Utc::now(),
            },
            GameHistoryEntry {
                game_id: 2,
                num_players: 2,
                score: 5,
                variant_id: 9999,
                variant_name: None,
                played_at: Utc::now(),
            },
        ];

        fill_variant_names(&mut entries);

        assert_eq!(entries[0].variant_name.as_deref(), Some("Rainbow"));
        assert_eq!(
            entries[1].variant_name.as_deref(),
            Some("Unknown Variant (9999)")
        );
    }
}
