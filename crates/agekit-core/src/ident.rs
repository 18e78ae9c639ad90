//! Human-legible identifier generation for graph entities.
//!
//! Idents are short English noun phrases ("clay_baking_fox") built from the
//! canonical adjective order, drawn adjective-tier by adjective-tier and
//! terminated by a noun. Composed words survive token-level stemming and
//! n-gramming far better than opaque ids, so a language model that has seen
//! an entity once can recall its key reliably.

use rand::seq::SliceRandom;

use crate::error::CoreError;

/// Default number of words composed into an ident.
pub const DEFAULT_WORD_COUNT: usize = 3;

/// Default word delimiter. Underscore keeps the phrase a single token unit
/// for most tokenizers.
pub const DEFAULT_DELIMITER: &str = "_";

// Canonical English adjective order: quantity, quality, size, age, shape,
// color, origin, material, purpose. Draws walk the reversed order so the
// words closest to the noun come first.

const QUANTITY: &[&str] = &[
    "one", "two", "several", "many", "few", "hundred", "dozen", "all", "some", "no",
];

const QUALITY: &[&str] = &[
    "lovely",
    "horrible",
    "delightful",
    "awful",
    "magnificent",
    "mediocre",
    "splendid",
    "terrible",
    "charming",
    "dreadful",
];

const SIZE: &[&str] = &[
    "tiny", "small", "medium", "large", "huge", "gigantic", "minuscule", "massive", "petite",
    "enormous",
];

const AGE: &[&str] = &[
    "young",
    "old",
    "ancient",
    "modern",
    "new",
    "antique",
    "recent",
    "medieval",
    "vintage",
    "prehistoric",
];

const SHAPE: &[&str] = &[
    "round",
    "square",
    "rectangular",
    "triangular",
    "flat",
    "bulky",
    "slender",
    "curved",
    "pointed",
    "oval",
];

const COLOR: &[&str] = &[
    "red", "green", "blue", "yellow", "black", "white", "purple", "orange", "pink", "gray",
];

const ORIGIN: &[&str] = &[
    "french", "american", "chinese", "egyptian", "greek", "roman", "japanese", "german",
    "russian", "brazilian", "italian", "spanish", "british", "scottish", "irish", "welsh",
    "swiss", "swedish", "norwegian", "danish", "finnish", "polish", "czech", "hungarian",
    "austrian", "belgian", "dutch", "portuguese", "turkish", "persian", "korean", "thai",
    "vietnamese", "australian", "canadian", "mexican", "chilean", "peruvian", "nigerian",
    "kenyan", "moroccan", "tunisian",
];

const MATERIAL: &[&str] = &[
    "tin", "wax", "fur", "ice", "gem", "oil", "tar", "net", "ash", "mud", "silk", "wool",
    "oak", "elm", "ivy", "pea", "den", "gum", "hay", "jet", "lid", "mat", "pad", "rag",
    "sap", "tan", "urn", "vat", "web", "yam", "clay", "sand",
];

const PURPOSE: &[&str] = &[
    "baking", "camping", "climbing", "cooking", "cutting", "diving", "drying", "eating",
    "fishing", "gardening", "grating", "growing", "hiking", "hunting", "icing", "jogging",
    "knitting", "measuring", "mixing", "nursing", "opening", "painting", "piping", "pouring",
    "quilting", "racing", "reading", "riding", "rowing", "running", "sailing", "serving",
    "sewing", "sleeping", "sowing", "stirring", "studying", "swimming", "teaching", "timing",
    "training", "traveling", "typing", "voting", "walking", "washing", "watering", "wiring",
];

const NOUN: &[&str] = &[
    "ox", "ant", "bee", "pig", "hen", "owl", "fox", "cow", "yak", "ram", "kid", "cop",
    "nun", "son", "pal", "gal", "guy", "lad", "doc", "sir", "spy", "vet", "cub", "cam",
    "cab", "bin", "bun", "bug", "bear", "bull", "deer", "duck", "goat", "king", "lady",
    "lion", "lord", "maid", "monk", "pope", "stag", "wolf", "hero", "guru", "jury", "pawn",
    "sage", "seer", "twin", "yogi",
];

/// Adjective tiers from noun-nearest outward.
fn reversed_adjective_tiers() -> [&'static [&'static str]; 9] {
    [
        PURPOSE, MATERIAL, ORIGIN, COLOR, SHAPE, AGE, SIZE, QUALITY, QUANTITY,
    ]
}

/// Generator of collision-resistant, human-legible entity keys.
///
/// Uniqueness is scoped to the caller's collection via the `is_taken`
/// predicate: the generator redraws on collision up to a bounded attempt
/// count and never returns a key the predicate rejects.
#[derive(Debug, Clone)]
pub struct IdentGenerator {
    max_attempts: usize,
}

impl Default for IdentGenerator {
    fn default() -> Self {
        Self { max_attempts: 32 }
    }
}

impl IdentGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the redraw budget.
    pub fn with_max_attempts(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    /// Compose a single candidate: `word_count - 1` adjectives from the
    /// reversed canonical order, then a noun, joined by `delimiter`.
    pub fn compose(&self, word_count: usize, delimiter: &str) -> Result<String, CoreError> {
        let tiers = reversed_adjective_tiers();
        if word_count < 1 || word_count > tiers.len() + 1 {
            return Err(CoreError::InvalidWordCount {
                word_count,
                max: tiers.len() + 1,
            });
        }

        let mut rng = rand::thread_rng();
        let mut parts: Vec<&str> = Vec::with_capacity(word_count);
        for tier in tiers.iter().take(word_count - 1) {
            // Vocabulary tiers are non-empty constants.
            if let Some(word) = tier.choose(&mut rng).copied() {
                parts.insert(0, word);
            }
        }
        if let Some(noun) = NOUN.choose(&mut rng).copied() {
            parts.push(noun);
        }

        Ok(parts.join(delimiter))
    }

    /// Generate an ident that is unique with respect to `is_taken`.
    ///
    /// Redraws on collision; fails with `GenerationExhausted` once the
    /// attempt budget runs out. Callers may retry with a larger word count.
    pub fn generate<F>(
        &self,
        word_count: usize,
        delimiter: &str,
        is_taken: F,
    ) -> Result<String, CoreError>
    where
        F: Fn(&str) -> bool,
    {
        for _ in 0..self.max_attempts {
            let candidate = self.compose(word_count, delimiter)?;
            if !is_taken(&candidate) {
                return Ok(candidate);
            }
        }

        tracing::warn!(
            word_count,
            attempts = self.max_attempts,
            "ident generation exhausted"
        );
        Err(CoreError::GenerationExhausted {
            attempts: self.max_attempts,
            word_count,
        })
    }
}
