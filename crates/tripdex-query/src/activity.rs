//! Activity term expansion and fuzzy matching.
//!
//! The synonym and category tables are static data compiled into an
//! immutable [`ActivityExpander`] once at process start; nothing here
//! mutates after construction.

use std::collections::{BTreeSet, HashMap};

/// Tense/phrasing variants. The map is bidirectional after construction:
/// every synonym of a key also maps back to the key and to its siblings.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("tour", &["tours", "tour", "guided tour", "guided tours"]),
    ("tours", &["tour", "tours", "guided tour", "guided tours"]),
    ("city tour", &["city tours", "city tour", "urban tour", "urban tours"]),
    ("city tours", &["city tour", "city tours", "urban tour", "urban tours"]),
    (
        "photography tour",
        &["photography tours", "photo tour", "photo tours", "photography tour"],
    ),
    (
        "photography tours",
        &["photography tour", "photography tours", "photo tour", "photo tours"],
    ),
    (
        "historical tour",
        &["historical tours", "history tour", "history tours", "historical tour"],
    ),
    (
        "historical tours",
        &["historical tour", "historical tours", "history tour", "history tours"],
    ),
    (
        "culinary tour",
        &["culinary tours", "food tour", "food tours", "culinary tour"],
    ),
    (
        "culinary tours",
        &["culinary tour", "culinary tours", "food tour", "food tours"],
    ),
    ("wine tasting", &["wine tastings", "wine tasting", "tasting", "tastings"]),
    ("snorkeling", &["snorkeling", "snorkel", "snorkelling", "snorkel diving"]),
    ("diving", &["diving", "scuba diving", "dive"]),
    ("hiking", &["hiking", "hike", "trekking", "trek"]),
    ("beach", &["beaches", "beach", "beach activities"]),
    ("beaches", &["beach", "beaches", "beach activities"]),
    ("museum", &["museums", "museum", "gallery", "galleries"]),
    ("museums", &["museum", "museums", "gallery", "galleries"]),
];

/// Category terms mapped to their constituent activities.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "outdoor",
        &[
            "hiking", "trekking", "camping", "rock climbing", "cycling", "kayaking",
            "rafting", "paragliding", "skydiving", "bungee jumping", "zip-lining",
            "snorkeling", "diving", "surfing", "beach", "beaches", "fishing",
            "bird watching", "wildlife viewing", "glacier tours", "volcano tours",
            "cave exploration", "adventure tours",
        ],
    ),
    (
        "outdoor activities",
        &[
            "hiking", "trekking", "camping", "rock climbing", "cycling", "kayaking",
            "rafting", "paragliding", "snorkeling", "diving", "surfing", "beach",
            "beaches", "fishing", "adventure tours",
        ],
    ),
    (
        "adventure",
        &[
            "hiking", "trekking", "rock climbing", "kayaking", "rafting", "paragliding",
            "skydiving", "bungee jumping", "zip-lining", "snorkeling", "diving",
            "surfing", "glacier tours", "volcano tours", "cave exploration",
            "adventure tours",
        ],
    ),
    (
        "adventure activities",
        &[
            "hiking", "trekking", "rock climbing", "kayaking", "rafting", "paragliding",
            "skydiving", "bungee jumping", "snorkeling", "diving", "surfing",
            "adventure tours",
        ],
    ),
    (
        "wellness",
        &[
            "yoga", "spa treatments", "meditation", "wellness retreats", "hot springs",
            "massage", "relaxation", "mindfulness",
        ],
    ),
    (
        "wellness retreats",
        &[
            "yoga", "spa treatments", "meditation", "wellness retreats", "hot springs",
            "massage", "relaxation",
        ],
    ),
    (
        "cultural",
        &[
            "museums", "art galleries", "temple visits", "historical tours",
            "cultural experiences", "traditional ceremonies", "tea ceremonies",
            "cultural heritage", "local traditions",
        ],
    ),
    (
        "cultural activities",
        &[
            "museums", "art galleries", "temple visits", "historical tours",
            "cultural experiences", "traditional ceremonies", "tea ceremonies",
        ],
    ),
    (
        "entertainment",
        &[
            "nightlife", "bars", "clubs", "concerts", "festivals", "casinos", "theater",
            "opera", "sports events", "jazz clubs", "music venues",
        ],
    ),
    (
        "nightlife",
        &["bars", "clubs", "nightlife", "jazz clubs", "music venues", "casinos"],
    ),
    (
        "culinary",
        &[
            "culinary tours", "food tours", "cooking classes", "wine tasting",
            "restaurants", "fine dining", "street food tours", "seafood dining",
            "sushi dining", "tapas tours",
        ],
    ),
    (
        "food",
        &[
            "culinary tours", "food tours", "cooking classes", "restaurants",
            "fine dining", "street food tours", "seafood dining", "sushi dining",
        ],
    ),
    (
        "water sports",
        &[
            "snorkeling", "diving", "surfing", "kayaking", "rafting", "swimming",
            "beach", "beaches", "water sports",
        ],
    ),
    (
        "water activities",
        &[
            "snorkeling", "diving", "surfing", "kayaking", "swimming", "beach",
            "beaches", "water sports",
        ],
    ),
    (
        "sports",
        &[
            "cycling", "hiking", "surfing", "tennis", "golf", "beach volleyball",
            "skiing", "snowboarding", "ice skating", "sports events",
        ],
    ),
    (
        "photography",
        &["photography tours", "photo tours", "photography", "stargazing"],
    ),
    (
        "nature",
        &[
            "hiking", "bird watching", "wildlife viewing", "stargazing", "glacier tours",
            "volcano tours", "cave exploration", "hot springs",
            "Northern Lights viewing",
        ],
    ),
    (
        "indoor",
        &[
            "museums", "art galleries", "spa treatments", "cooking classes",
            "wine tasting", "casinos", "theater", "opera", "shopping",
        ],
    ),
];

const FUZZY_THRESHOLD: f64 = 0.8;

/// Expands an activity term into a superset of synonyms, plural/singular
/// variants, and constituent activities when the term names a category.
/// Expansion never shrinks below the identity: the normalized input is
/// always a member of the result.
pub struct ActivityExpander {
    synonym_map: HashMap<String, BTreeSet<String>>,
    categories: Vec<(String, Vec<String>)>,
}

impl ActivityExpander {
    pub fn new() -> Self {
        let mut synonym_map: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (key, synonyms) in SYNONYMS {
            for synonym in *synonyms {
                let entry = synonym_map.entry(normalize(synonym)).or_default();
                entry.insert(normalize(key));
                for sibling in *synonyms {
                    entry.insert(normalize(sibling));
                }
            }
        }
        let categories = CATEGORIES
            .iter()
            .map(|(name, members)| {
                (
                    normalize(name),
                    members.iter().map(|m| (*m).to_string()).collect(),
                )
            })
            .collect();
        Self {
            synonym_map,
            categories,
        }
    }

    /// Expand one activity term. The result is an ordered set so query
    /// construction downstream is deterministic.
    pub fn expand(&self, term: &str) -> BTreeSet<String> {
        let normalized = normalize(term);
        let mut expanded = BTreeSet::new();
        expanded.insert(term.trim().to_lowercase());
        expanded.insert(normalized.clone());

        // Substring category matching covers both the exact-key case and
        // looser compound phrasings ("outdoor activities" contains
        // "outdoor").
        for (name, members) in &self.categories {
            if normalized.contains(name.as_str()) || name.contains(&normalized) {
                for member in members {
                    expanded.insert(member.clone());
                    expanded.insert(normalize(member));
                }
            }
        }

        if let Some(synonyms) = self.synonym_map.get(&normalized) {
            expanded.extend(synonyms.iter().cloned());
        }

        // Cheap plural/singular toggle, not a stemmer; "bus" -> "bu" is an
        // accepted false positive.
        if let Some(singular) = normalized.strip_suffix('s') {
            expanded.insert(singular.to_string());
        } else {
            expanded.insert(format!("{normalized}s"));
        }

        expanded
    }

    /// Union of `expand` over every term.
    pub fn expand_all(&self, terms: &[String]) -> BTreeSet<String> {
        let mut expanded = BTreeSet::new();
        for term in terms {
            expanded.extend(self.expand(term));
        }
        expanded
    }

    /// Approximate string equivalence at the default threshold.
    pub fn fuzzy_match(&self, a: &str, b: &str) -> bool {
        self.fuzzy_match_with(a, b, FUZZY_THRESHOLD)
    }

    /// Approximate string equivalence: exact after normalization, substring
    /// either way, plural/singular variants, or character-overlap
    /// similarity above `threshold`. The similarity measure is order- and
    /// multiplicity-insensitive by design ("abc" vs "cab" scores 1.0); it
    /// is not edit distance.
    pub fn fuzzy_match_with(&self, a: &str, b: &str, threshold: f64) -> bool {
        let a = normalize(a);
        let b = normalize(b);
        if a == b {
            return true;
        }
        if a.contains(b.as_str()) || b.contains(a.as_str()) {
            return true;
        }
        if is_plural_variant(&a, &b) {
            return true;
        }
        char_overlap(&a, &b) >= threshold
    }

    /// True if any expanded query term matches any data term, exactly
    /// (post-normalization) or fuzzily. Empty input on either side never
    /// matches.
    pub fn match_any(&self, query_terms: &[String], data_terms: &[String]) -> bool {
        if query_terms.is_empty() || data_terms.is_empty() {
            return false;
        }
        let expanded = self.expand_all(query_terms);
        for data_term in data_terms {
            if self.matches_expanded(&expanded, data_term) {
                return true;
            }
        }
        false
    }

    /// Collect the data terms (raw form, input order) that match at least
    /// one expanded query term. The inner loop stops at the first matching
    /// expansion per data term.
    pub fn find_matches(&self, query_terms: &[String], data_terms: &[String]) -> Vec<String> {
        if query_terms.is_empty() || data_terms.is_empty() {
            return Vec::new();
        }
        let expanded = self.expand_all(query_terms);
        data_terms
            .iter()
            .filter(|data_term| self.matches_expanded(&expanded, data_term))
            .cloned()
            .collect()
    }

    fn matches_expanded(&self, expanded: &BTreeSet<String>, data_term: &str) -> bool {
        let data_norm = normalize(data_term);
        if expanded.contains(&data_norm) {
            return true;
        }
        expanded
            .iter()
            .any(|query_term| self.fuzzy_match(query_term, data_term))
    }
}

impl Default for ActivityExpander {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-case, trim, collapse internal whitespace.
pub fn normalize(term: &str) -> String {
    term.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_plural_variant(a: &str, b: &str) -> bool {
    let base_a = strip_variant_suffixes(a);
    let base_b = strip_variant_suffixes(b);
    if base_a == base_b && base_a.len() > 2 {
        return true;
    }
    a.strip_suffix('s') == Some(b)
        || a.strip_suffix("es") == Some(b)
        || b.strip_suffix('s') == Some(a)
        || b.strip_suffix("es") == Some(a)
}

fn strip_variant_suffixes(s: &str) -> &str {
    let s = s.strip_suffix('s').unwrap_or(s);
    let s = s.strip_suffix("es").unwrap_or(s);
    s.strip_suffix("ing").unwrap_or(s)
}

fn char_overlap(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.chars().filter(|c| b.contains(*c)).count();
    let max_len = a.chars().count().max(b.chars().count());
    common as f64 / max_len as f64
}
