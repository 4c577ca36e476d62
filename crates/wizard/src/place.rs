use serde::{Deserialize, Serialize};

use crate::machine::StepDef;

/// Fixed palettes a fresh draft draws from. UI tuning values.
const PIN_COLORS: &[&str] = &[
    "#e63946", "#f4a261", "#e9c46a", "#2a9d8f", "#457b9d", "#8338ec",
];
const PIN_ICONS: &[&str] = &["pin", "star", "coffee", "food", "camera", "bed", "tree"];

/// The accumulated "add a place" form. Every field is optional until the
/// step that requires it enforces validation at transition time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub note: String,
    /// Overall rating, 1..=5.
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub photos: Vec<String>,
    /// Short tips other users can vote on.
    #[serde(default)]
    pub must_knows: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl PlaceDraft {
    /// A fresh draft with a generated color/icon pair. The seed comes from
    /// the host (typically the clock) so the core stays deterministic.
    pub fn generated(seed: u64) -> Self {
        let color = PIN_COLORS[(seed as usize) % PIN_COLORS.len()];
        let icon = PIN_ICONS[(seed as usize / PIN_COLORS.len()) % PIN_ICONS.len()];
        Self {
            color: color.to_string(),
            icon: icon.to_string(),
            ..Self::default()
        }
    }
}

fn validate_location(d: &PlaceDraft) -> Result<(), String> {
    if d.latitude.is_none() || d.longitude.is_none() {
        return Err("Pick a spot on the map first".to_string());
    }
    Ok(())
}

fn validate_customize(d: &PlaceDraft) -> Result<(), String> {
    if d.name.trim().is_empty() {
        return Err("Please give this place a name".to_string());
    }
    Ok(())
}

fn validate_details(d: &PlaceDraft) -> Result<(), String> {
    match d.rating {
        None => Err("Add a rating before continuing".to_string()),
        Some(r) if !(1..=5).contains(&r) => Err("Rating must be between 1 and 5".to_string()),
        Some(_) => Ok(()),
    }
}

/// Step sequence for the add-a-place wizard.
pub fn place_steps() -> Vec<StepDef<PlaceDraft>> {
    vec![
        StepDef::new("search", validate_location),
        StepDef::new("customize", validate_customize),
        StepDef::new("details", validate_details),
        StepDef::open("review"),
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{PlaceDraft, place_steps};
    use crate::machine::{BackOutcome, Direction, Wizard};
    use crate::session::FormSession;
    use storage::{KeyValueStore, MemoryStore, keys};

    fn located_named_draft() -> PlaceDraft {
        PlaceDraft {
            name: "Blue Bottle".to_string(),
            latitude: Some(37.77),
            longitude: Some(-122.42),
            rating: Some(4),
            ..PlaceDraft::generated(0)
        }
    }

    #[test]
    fn generated_drafts_cycle_through_the_palettes() {
        let a = PlaceDraft::generated(0);
        let b = PlaceDraft::generated(1);
        assert_ne!(a.color, b.color);
        assert!(a.color.starts_with('#'));
        assert!(!a.icon.is_empty());
        assert!(a.name.is_empty());
    }

    #[test]
    fn customize_step_requires_a_non_whitespace_name() {
        let mut w = Wizard::new(place_steps()).unwrap();
        let mut draft = located_named_draft();
        draft.name = "  ".to_string();

        assert_eq!(w.next(&draft), Ok(true)); // search -> customize
        let err = w.next(&draft).unwrap_err();
        assert_eq!(err, "Please give this place a name");
        assert_eq!(w.step_index(), 1);

        draft.name = "Blue Bottle".to_string();
        assert_eq!(w.next(&draft), Ok(true));
        assert_eq!(w.step_index(), 2);
        assert_eq!(w.direction(), Direction::Forward);
    }

    #[test]
    fn details_step_requires_a_valid_rating() {
        let mut w = Wizard::new(place_steps()).unwrap();
        let mut draft = located_named_draft();
        w.next(&draft).unwrap();
        w.next(&draft).unwrap();

        draft.rating = None;
        assert!(w.next(&draft).is_err());
        draft.rating = Some(9);
        assert!(w.next(&draft).is_err());
        draft.rating = Some(5);
        assert_eq!(w.next(&draft), Ok(true));
        assert!(w.is_last_step());
    }

    #[test]
    fn back_from_search_asks_the_host_to_cancel() {
        let mut w = Wizard::new(place_steps()).unwrap();
        assert_eq!(w.back(), BackOutcome::CancelRequested);
    }

    #[test]
    fn cancel_at_first_step_discards_the_draft_and_regenerates_the_look() {
        let store = MemoryStore::new();
        let mut session =
            FormSession::open(store, keys::ADD_PLACE_FORM, PlaceDraft::generated(0)).unwrap();
        session
            .update(|d| {
                d.name = "Half-filled".to_string();
            })
            .unwrap();
        let old_color = session.data().color.clone();

        let mut w = Wizard::new(place_steps()).unwrap();
        assert_eq!(w.back(), BackOutcome::CancelRequested);
        session.reset(PlaceDraft::generated(1)).unwrap();

        // The fresh draft is empty with a newly generated color.
        assert!(session.data().name.is_empty());
        assert_ne!(session.data().color, old_color);

        // Nothing remains persisted under the form key.
        let store = session.into_store();
        assert_eq!(store.get(keys::ADD_PLACE_FORM).unwrap(), None);
    }
}
