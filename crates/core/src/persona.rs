//! Persona synthesis from listening data.
//!
//! Turns two comma-separated free-text lists (artists and genres) into a
//! [`Persona`]: a DJ name, a short bio, and the fixed visual catalog that
//! drives prompt generation. The classification is a fixed, ordered rule
//! table, so the same input always yields the same persona.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const WAREHOUSE_VIBE: &str = "warehouse-grade energy";
pub const EARTHY_VIBE: &str = "earthy percussion and rolling grooves";
pub const MELODIC_VIBE: &str = "melodic undertones and late-night hypnosis";

/// Used when no genre rule matches.
pub const FALLBACK_VIBE: &str = "eclectic selection and dance-floor focus";

/// Ordered genre rules. Each matching rule contributes its phrase once.
const VIBE_RULES: &[(&[&str], &str)] = &[
    (&["techno", "hard techno", "edm", "electro house"], WAREHOUSE_VIBE),
    (&["afro house", "amapiano", "afro", "deep house"], EARTHY_VIBE),
    (&["melodic techno", "progressive house", "trance"], MELODIC_VIBE),
];

/// Name stem when no artist was given.
pub const DEFAULT_BASE_NAME: &str = "Meta";

/// Bio influence text when no artist was given.
pub const DEFAULT_INFLUENCE: &str = "diverse sounds";

/// Maximum number of artists quoted in the bio.
pub const MAX_BIO_ARTISTS: usize = 4;

/// Dark futuristic palette shared by every persona.
pub const PALETTE: [&str; 4] = ["#0F0F10", "#12131A", "#00D4AA", "#FF6B35"];

pub const STYLE_TAGS: &[&str] = &[
    "club lighting",
    "editorial portrait",
    "motion blur",
    "neon accents",
];

pub const LOGO_SHAPE: &str = "circular monogram";

pub const LOCATIONS: &[&str] = &[
    "underground booth",
    "festival stage",
    "studio portrait",
    "neon hallway",
    "foggy dance floor",
];

pub const OUTFITS: &[&str] = &[
    "all-black techwear",
    "utility vest + headphones",
    "heritage textile accent",
    "oversized bomber",
    "graphic tee + cargo",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Derived descriptive profile used to drive image-prompt generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub dj_name: String,
    pub bio: String,
    pub palette: Vec<String>,
    pub style_tags: Vec<String>,
    pub logo_shape: String,
    pub locations: Vec<String>,
    pub outfits: Vec<String>,
    /// Never empty; order follows [`VIBE_RULES`].
    pub vibe_phrases: Vec<String>,
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Split a comma-separated list, trimming whitespace and dropping empty tokens.
pub fn split_csv(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Classify lower-cased genres into vibe phrases.
///
/// Rules are evaluated in table order; the result is never empty.
pub fn classify_vibes(genres: &[String]) -> Vec<String> {
    let mut phrases: Vec<String> = VIBE_RULES
        .iter()
        .filter(|(set, _)| genres.iter().any(|g| set.contains(&g.as_str())))
        .map(|(_, phrase)| phrase.to_string())
        .collect();

    if phrases.is_empty() {
        phrases.push(FALLBACK_VIBE.to_string());
    }
    phrases
}

/// Build a persona from comma-separated artist and genre lists.
///
/// Total for any input, including empty strings.
pub fn synthesize(artists_text: &str, genres_text: &str) -> Persona {
    let artists = split_csv(artists_text);
    let genres: Vec<String> = split_csv(genres_text)
        .into_iter()
        .map(|g| g.to_lowercase())
        .collect();

    let vibe_phrases = classify_vibes(&genres);

    let base_name = artists
        .first()
        .and_then(|a| a.split_whitespace().next())
        .unwrap_or(DEFAULT_BASE_NAME);
    let suffix = if vibe_phrases.iter().any(|p| p == WAREHOUSE_VIBE) {
        "Pulse"
    } else {
        "Wave"
    };
    let dj_name = format!("{base_name}{suffix}");

    let influence = if artists.is_empty() {
        DEFAULT_INFLUENCE.to_string()
    } else {
        artists
            .iter()
            .take(MAX_BIO_ARTISTS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let bio = format!("{}. Influenced by {influence}.", vibe_phrases.join(" and "));

    Persona {
        dj_name,
        bio,
        palette: to_owned_list(&PALETTE),
        style_tags: to_owned_list(STYLE_TAGS),
        logo_shape: LOGO_SHAPE.to_string(),
        locations: to_owned_list(LOCATIONS),
        outfits: to_owned_list(OUTFITS),
        vibe_phrases,
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_drops_empty_tokens() {
        assert_eq!(
            split_csv(" Black Coffee ,, Keinemusik ,  "),
            vec!["Black Coffee".to_string(), "Keinemusik".to_string()]
        );
        assert!(split_csv("").is_empty());
        assert!(split_csv(" , ,").is_empty());
    }

    #[test]
    fn techno_only_is_warehouse_pulse() {
        let persona = synthesize("Amelie Lens", "techno");
        assert_eq!(persona.vibe_phrases, vec![WAREHOUSE_VIBE.to_string()]);
        assert!(persona.dj_name.ends_with("Pulse"));
        assert_eq!(persona.dj_name, "AmeliePulse");
    }

    #[test]
    fn empty_inputs_fall_back() {
        let persona = synthesize("", "");
        assert!(persona.dj_name.starts_with("Meta"));
        assert_eq!(persona.dj_name, "MetaWave");
        assert_eq!(persona.vibe_phrases, vec![FALLBACK_VIBE.to_string()]);
        assert_eq!(
            persona.bio,
            "eclectic selection and dance-floor focus. Influenced by diverse sounds."
        );
    }

    #[test]
    fn afro_house_scenario() {
        let persona = synthesize("Black Coffee, Keinemusik", "afro house, deep house");
        assert!(persona.vibe_phrases.contains(&EARTHY_VIBE.to_string()));
        assert_eq!(persona.vibe_phrases.len(), 1);
        assert_eq!(persona.dj_name, "BlackWave");
        assert_eq!(
            persona.bio,
            "earthy percussion and rolling grooves. Influenced by Black Coffee, Keinemusik."
        );
    }

    #[test]
    fn multiple_rules_keep_table_order() {
        let persona = synthesize("", "Trance, amapiano, EDM");
        assert_eq!(
            persona.vibe_phrases,
            vec![
                WAREHOUSE_VIBE.to_string(),
                EARTHY_VIBE.to_string(),
                MELODIC_VIBE.to_string(),
            ]
        );
        assert_eq!(persona.dj_name, "MetaPulse");
        assert!(persona.bio.starts_with(
            "warehouse-grade energy and earthy percussion and rolling grooves and melodic"
        ));
    }

    #[test]
    fn genre_matching_is_case_insensitive_but_exact() {
        assert_eq!(classify_vibes(&["deep house".to_string()]), vec![EARTHY_VIBE]);
        // Substrings do not match.
        assert_eq!(classify_vibes(&["deep house music".to_string()]), vec![FALLBACK_VIBE]);
        let persona = synthesize("", "  Hard Techno ");
        assert_eq!(persona.vibe_phrases, vec![WAREHOUSE_VIBE.to_string()]);
    }

    #[test]
    fn bio_quotes_at_most_four_artists() {
        let persona = synthesize("A One, B Two, C Three, D Four, E Five", "");
        assert_eq!(
            persona.bio,
            "eclectic selection and dance-floor focus. Influenced by A One, B Two, C Three, D Four."
        );
        assert_eq!(persona.dj_name, "AWave");
    }

    #[test]
    fn constants_are_not_derived_from_input() {
        let a = synthesize("X", "techno");
        let b = synthesize("", "");
        assert_eq!(a.palette, b.palette);
        assert_eq!(a.palette.len(), 4);
        assert_eq!(a.style_tags, b.style_tags);
        assert_eq!(a.outfits, b.outfits);
        assert_eq!(a.locations, b.locations);
        assert_eq!(a.logo_shape, LOGO_SHAPE);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let first = synthesize("Charlotte de Witte, Adam Beyer", "techno, trance");
        for _ in 0..10 {
            let again = synthesize("Charlotte de Witte, Adam Beyer", "techno, trance");
            assert_eq!(again, first);
            assert_eq!(
                serde_json::to_string(&again).unwrap(),
                serde_json::to_string(&first).unwrap()
            );
        }
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(synthesize("", "")).unwrap();
        assert_eq!(json["djName"], "MetaWave");
        assert!(json["vibePhrases"].is_array());
        assert!(json["styleTags"].is_array());
        assert_eq!(json["logoShape"], "circular monogram");
    }
}
