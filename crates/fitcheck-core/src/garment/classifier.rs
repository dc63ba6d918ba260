//! Garment category classifier.
//!
//! Maps a display name (Vietnamese or English) to an outfit slot by
//! case-insensitive matching over fixed keyword tables, checked in priority
//! order: full-body cues, tops, bottoms, accessories. Keywords match as
//! substrings; the short English cues in the `*_WORDS` tables only match as
//! whole words. Anything unmatched, including an empty name, is treated as a
//! full-body garment.

use super::model::Category;

/// Multi-part sets and one-piece garments. Checked first so that names such as
/// "áo dài" never fall through to the `áo` top keyword.
const FULL_BODY_KEYWORDS: &[&str] = &[
    "áo dài",
    "bộ",
    "đầm",
    "váy liền",
    "buddhist",
    "jumpsuit",
];

/// "sunset" and "wardrobe" are not sets or robes.
const FULL_BODY_WORDS: &[&str] = &["set", "robe"];

const TOP_KEYWORDS: &[&str] = &[
    "áo", "top", "shirt", "hoodie", "jacket", "coat", "sweater",
];

const BOTTOM_KEYWORDS: &[&str] = &[
    "quần",
    "chân váy",
    "short",
    "jeans",
    "pants",
    "skirt",
    "bottom",
    "jogger",
    "jort",
    "trousers",
    "legging",
    "kaki",
];

const ACCESSORY_KEYWORDS: &[&str] = &[
    "túi",
    "nón",
    "mũ",
    "kính",
    "đồng hồ",
    "dây chuyền",
    "nhẫn",
    "bông tai",
    "bag",
    "glasses",
    "jewelry",
    "accessory",
    "phụ kiện",
    "khuyên",
    "vòng",
    "wallet",
    "backpack",
];

const ACCESSORY_WORDS: &[&str] = &["hat", "cap"];

/// Classifies a garment by its display name.
///
/// Total and deterministic: every input maps to exactly one category.
pub fn classify(name: &str) -> Category {
    let lower = name.trim().to_lowercase();
    if lower.is_empty() {
        return Category::FullBody;
    }

    if contains_any(&lower, FULL_BODY_KEYWORDS) || has_word(&lower, FULL_BODY_WORDS) {
        return Category::FullBody;
    }
    if contains_any(&lower, TOP_KEYWORDS) {
        return Category::Top;
    }
    if contains_any(&lower, BOTTOM_KEYWORDS) {
        return Category::Bottom;
    }
    if contains_any(&lower, ACCESSORY_KEYWORDS) || has_word(&lower, ACCESSORY_WORDS) {
        return Category::Accessory;
    }

    Category::FullBody
}

/// Uses the explicit category when one is given, otherwise classifies the name.
pub fn classify_with_hint(name: &str, hint: Option<Category>) -> Category {
    hint.unwrap_or_else(|| classify(name))
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}

fn has_word(haystack: &str, words: &[&str]) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| words.contains(&token))
}
