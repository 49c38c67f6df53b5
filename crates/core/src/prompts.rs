//! Image prompt templating.
//!
//! Renders a [`Persona`] into an ordered list of prompts. Attributes are
//! distributed by index cycling over small fixed catalogs, so a batch keeps
//! the same subject while varying shot, outfit and styling.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::persona::Persona;

/// Camera and lighting boilerplate prepended to every prompt.
pub const ANCHOR_CLAUSE: &str = "Maintain the same subject across all images; \
contemporary editorial lighting; 50mm/85mm depth of field; no extra people; \
crisp face; slight motion blur on hands; cinematic contrast.";

/// A (shot type, location) pair used to diversify a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub title: &'static str,
    pub location: &'static str,
}

const fn variant(title: &'static str, location: &'static str) -> Variant {
    Variant { title, location }
}

/// Four-shot studio table used with the dedicated image backend.
pub const STUDIO_VARIANTS: &[Variant] = &[
    variant("portrait press shot", "studio with dark background"),
    variant("half-body with headphones", "underground club booth"),
    variant("action behind DJ decks", "modern club stage with lighting"),
    variant("wide shot with equipment", "professional studio setup"),
];

/// Eight-shot editorial table.
pub const EDITORIAL_VARIANTS: &[Variant] = &[
    variant("portrait press shot", "studio portrait"),
    variant("half-body with headphones", "underground booth"),
    variant("action behind DJ decks", "club stage"),
    variant("wide festival banner frame", "festival stage"),
    variant("graphic flyer composition", "neon hallway"),
    variant("close-up with accessory", "studio portrait"),
    variant("crowd bokeh action", "foggy dance floor"),
    variant("side-profile moody shot", "underground booth"),
];

/// Which variant table a deployment renders prompts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VariantTable {
    #[default]
    Studio,
    Editorial,
}

impl VariantTable {
    pub fn variants(self) -> &'static [Variant] {
        match self {
            VariantTable::Studio => STUDIO_VARIANTS,
            VariantTable::Editorial => EDITORIAL_VARIANTS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VariantTable::Studio => "studio",
            VariantTable::Editorial => "editorial",
        }
    }
}

impl fmt::Display for VariantTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantTable {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "studio" => Ok(VariantTable::Studio),
            "editorial" => Ok(VariantTable::Editorial),
            other => Err(CoreError::Validation(format!(
                "Unknown prompt variant table '{other}' (expected 'studio' or 'editorial')"
            ))),
        }
    }
}

/// Textual mention of uploaded reference photos, empty when there are none.
pub fn photo_context_prefix(photos_used: usize) -> String {
    match photos_used {
        0 => String::new(),
        1 => "Reference: 1 uploaded photo of the subject. ".to_string(),
        n => format!("Reference: {n} uploaded photos of the subject. "),
    }
}

/// Render `min(count, variants.len())` prompts for a persona.
///
/// Prompt `i` uses variant `i`, outfit `i mod outfits` and style tag
/// `i mod style_tags`. Requests beyond the table length are clamped rather
/// than cycled, so no shot is repeated within a batch.
pub fn build_prompts(
    persona: &Persona,
    count: usize,
    context_prefix: &str,
    variants: &[Variant],
) -> Vec<String> {
    let palette = persona.palette.join(", ");

    variants
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, v)| {
            let outfit = cycle(&persona.outfits, i);
            let style_tag = cycle(&persona.style_tags, i);
            format!(
                "{context_prefix}{ANCHOR_CLAUSE} A {title} of DJ {dj_name}, wearing {outfit}, \
                 in {location}, styled as {style_tag}, using color palette {palette}, \
                 professional lighting, high quality photograph.",
                title = v.title,
                dj_name = persona.dj_name,
                location = v.location,
            )
        })
        .collect()
}

/// Index into a catalog with wrap-around. Empty catalogs yield `""`.
fn cycle(items: &[String], index: usize) -> &str {
    if items.is_empty() {
        return "";
    }
    &items[index % items.len()]
}
