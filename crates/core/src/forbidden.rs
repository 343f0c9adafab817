//! Forbidden-term filtering for customer-written text.
//!
//! Brand and franchise names must never reach a generation model. Each
//! term in the lexicon carries replacement phrases that keep the intent
//! ("disney" becomes "fairytale") without the IP reference. Replacement
//! order follows the lexicon, not the text: each keyword is replaced
//! repeatedly in the progressively-mutated string before moving on to the
//! next keyword.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

/// A restricted keyword and its allowed replacement phrases.
///
/// Invariant: no alternative may contain any lexicon keyword as a whole
/// word, otherwise filtering could loop or re-introduce a term. Pinned by
/// the `no_alternative_collides_with_a_keyword` test.
pub struct ForbiddenTerm {
    pub keyword: &'static str,
    pub alternatives: &'static [&'static str],
}

/// Restricted brand and franchise terms, in replacement order.
pub const FORBIDDEN_TERMS: &[ForbiddenTerm] = &[
    ForbiddenTerm {
        keyword: "disney",
        alternatives: &["fairytale", "magical kingdom", "enchanted"],
    },
    ForbiddenTerm {
        keyword: "mickey mouse",
        alternatives: &["cheerful cartoon mouse", "classic cartoon character"],
    },
    ForbiddenTerm {
        keyword: "minnie mouse",
        alternatives: &["sweet cartoon mouse with a bow", "polka-dot cartoon mouse"],
    },
    ForbiddenTerm {
        keyword: "frozen",
        alternatives: &["winter wonderland", "ice palace"],
    },
    ForbiddenTerm {
        keyword: "elsa",
        alternatives: &["ice queen", "snow princess"],
    },
    ForbiddenTerm {
        keyword: "spiderman",
        alternatives: &["heroic web slinger", "red and blue comic hero"],
    },
    ForbiddenTerm {
        keyword: "spider-man",
        alternatives: &["heroic web slinger", "red and blue comic hero"],
    },
    ForbiddenTerm {
        keyword: "batman",
        alternatives: &["caped crusader", "night guardian"],
    },
    ForbiddenTerm {
        keyword: "superman",
        alternatives: &["caped flying hero", "man of steel-blue"],
    },
    ForbiddenTerm {
        keyword: "marvel",
        alternatives: &["comic book style", "action hero theme"],
    },
    ForbiddenTerm {
        keyword: "pokemon",
        alternatives: &["cute collectible creatures", "playful anime creatures"],
    },
    ForbiddenTerm {
        keyword: "pikachu",
        alternatives: &["yellow electric mascot", "cheerful yellow creature"],
    },
    ForbiddenTerm {
        keyword: "hello kitty",
        alternatives: &["cute white kitten", "kawaii cat"],
    },
    ForbiddenTerm {
        keyword: "barbie",
        alternatives: &["glamorous fashion doll", "pink fashion doll"],
    },
    ForbiddenTerm {
        keyword: "paw patrol",
        alternatives: &["rescue puppies", "heroic puppies"],
    },
    ForbiddenTerm {
        keyword: "peppa pig",
        alternatives: &["cartoon piglet", "pink piglet"],
    },
    ForbiddenTerm {
        keyword: "harry potter",
        alternatives: &["wizard school", "magical academy"],
    },
    ForbiddenTerm {
        keyword: "star wars",
        alternatives: &["space opera", "galactic adventure"],
    },
    ForbiddenTerm {
        keyword: "minions",
        alternatives: &["little yellow helpers", "goggled yellow characters"],
    },
];

/// Whole-word, case-insensitive patterns, one per lexicon entry.
/// Compiled once, reused forever.
static KEYWORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    FORBIDDEN_TERMS
        .iter()
        .map(|term| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term.keyword)))
                .expect("valid regex")
        })
        .collect()
});

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// One substitution performed by [`filter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub original: String,
    pub replacement: String,
    /// Byte offset of the match in the working string at replacement time.
    pub offset: usize,
}

/// Result of filtering a piece of text.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub cleaned_text: String,
    pub replacements: Vec<Replacement>,
    /// One human-readable warning per replacement, for audit logging.
    pub warnings: Vec<String>,
}

/// Replace every forbidden term in `text` with a randomly chosen
/// alternative.
///
/// The random source is injected so callers can seed it for reproducible
/// output.
pub fn filter<R: Rng + ?Sized>(text: &str, rng: &mut R) -> FilterOutcome {
    let mut cleaned = text.to_string();
    let mut replacements = Vec::new();
    let mut warnings = Vec::new();

    for (term, pattern) in FORBIDDEN_TERMS.iter().zip(KEYWORD_PATTERNS.iter()) {
        while let Some(found) = pattern.find(&cleaned) {
            let range = found.range();
            let original = found.as_str().to_string();
            let choice = rng.random_range(0..term.alternatives.len());
            let replacement = term.alternatives[choice];

            warnings.push(format!(
                "Replaced restricted term \"{original}\" with \"{replacement}\""
            ));
            replacements.push(Replacement {
                original,
                replacement: replacement.to_string(),
                offset: range.start,
            });
            cleaned.replace_range(range, replacement);
        }
    }

    FilterOutcome {
        cleaned_text: cleaned,
        replacements,
        warnings,
    }
}

/// Whether any forbidden term appears in the text. No mutation.
pub fn contains_forbidden_terms(text: &str) -> bool {
    KEYWORD_PATTERNS.iter().any(|pattern| pattern.is_match(text))
}

/// Which lexicon keywords appear in the text, in lexicon order. No mutation.
pub fn detect(text: &str) -> Vec<&'static str> {
    FORBIDDEN_TERMS
        .iter()
        .zip(KEYWORD_PATTERNS.iter())
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(term, _)| term.keyword)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    // -- lexicon invariants ---------------------------------------------------

    #[test]
    fn no_alternative_collides_with_a_keyword() {
        for term in FORBIDDEN_TERMS {
            for alternative in term.alternatives {
                assert!(
                    !contains_forbidden_terms(alternative),
                    "alternative {alternative:?} for {:?} matches a keyword",
                    term.keyword
                );
            }
        }
    }

    #[test]
    fn every_term_has_an_alternative() {
        for term in FORBIDDEN_TERMS {
            assert!(
                !term.alternatives.is_empty(),
                "{:?} has no alternatives",
                term.keyword
            );
        }
    }

    // -- filter ---------------------------------------------------------------

    #[test]
    fn replaces_single_term() {
        let outcome = filter("a disney themed cake", &mut rng());
        assert!(!contains_forbidden_terms(&outcome.cleaned_text));
        assert_eq!(outcome.replacements.len(), 1);
        assert_eq!(outcome.replacements[0].original, "disney");
        assert_eq!(outcome.replacements[0].offset, 2);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("disney"));
    }

    #[test]
    fn replaces_repeated_term_independently() {
        let outcome = filter("disney castle, disney colors", &mut rng());
        assert!(!contains_forbidden_terms(&outcome.cleaned_text));
        assert_eq!(outcome.replacements.len(), 2);
        for replacement in &outcome.replacements {
            assert!(FORBIDDEN_TERMS[0]
                .alternatives
                .contains(&replacement.replacement.as_str()));
        }
    }

    #[test]
    fn match_is_case_insensitive_and_preserves_original_casing() {
        let outcome = filter("DISNEY please", &mut rng());
        assert_eq!(outcome.replacements[0].original, "DISNEY");
        assert!(!contains_forbidden_terms(&outcome.cleaned_text));
    }

    #[test]
    fn whole_word_only() {
        // "disneyland" must not match the "disney" keyword.
        let outcome = filter("disneyland", &mut rng());
        assert!(outcome.replacements.is_empty());
        assert_eq!(outcome.cleaned_text, "disneyland");
    }

    #[test]
    fn multi_word_keywords_match() {
        let outcome = filter("a Hello Kitty birthday cake", &mut rng());
        assert_eq!(outcome.replacements.len(), 1);
        assert_eq!(outcome.replacements[0].original, "Hello Kitty");
    }

    #[test]
    fn replacement_order_follows_lexicon_not_text() {
        // "elsa" precedes "star wars" in the lexicon even though the text
        // mentions them in the opposite order.
        let outcome = filter("star wars ship next to elsa", &mut rng());
        assert_eq!(outcome.replacements.len(), 2);
        assert_eq!(outcome.replacements[0].original, "elsa");
        assert_eq!(outcome.replacements[1].original, "star wars");
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = filter("disney and batman", &mut rng());
        let b = filter("disney and batman", &mut rng());
        assert_eq!(a.cleaned_text, b.cleaned_text);
        assert_eq!(a.replacements, b.replacements);
    }

    #[test]
    fn clean_text_passes_through_unchanged() {
        let outcome = filter("elegant pink roses", &mut rng());
        assert_eq!(outcome.cleaned_text, "elegant pink roses");
        assert!(outcome.replacements.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    // -- detection ------------------------------------------------------------

    #[test]
    fn detect_lists_keywords_in_lexicon_order() {
        let found = detect("pikachu rides with elsa");
        assert_eq!(found, vec!["elsa", "pikachu"]);
    }

    #[test]
    fn detection_is_idempotent_after_filtering() {
        let texts = [
            "disney princess cake",
            "spider-man and Batman together",
            "FROZEN themed with elsa and minions",
        ];
        for text in texts {
            let outcome = filter(text, &mut rng());
            assert!(
                !contains_forbidden_terms(&outcome.cleaned_text),
                "residual forbidden term in {:?}",
                outcome.cleaned_text
            );
        }
    }
}
