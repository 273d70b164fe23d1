//! # Category Classifier
//!
//! Keyword rules over the lower-cased title plus tags. Rule sets are tried in
//! order and the first one with any substring hit wins, so a title with both
//! Sports and Finance keywords is Sports. Matching is plain substring search:
//! `"win"` hits `"winter"` and `"eth"` hits `"method"`. That imprecision is
//! kept on purpose so labels stay stable across reruns.

use crate::constants::Category;

pub const SPORTS_KEYWORDS: &[&str] = &[
    "nba", "nfl", "nhl", "mlb", "soccer", "basketball", "football", "baseball", "hockey", "ncaa",
    "fifa", "champion", "playoff", "finals", "game", "vs", "vs.", " v ", " v. ", "versus", "team",
    "player", "score", "win", "match", "tennis", "cricket", "golf", "racing", "boxing", "ufc",
    "mma", "esports", "league", "tournament",
];

pub const CRYPTO_KEYWORDS: &[&str] = &[
    "bitcoin", "btc", "ethereum", "eth", "crypto", "blockchain", "defi", "nft", "solana", "xrp",
    "ripple", "cardano", "ada", "doge", "coin", "token", "wallet", "mining", "exchange", "binance",
    "coinbase",
];

pub const POLITICS_KEYWORDS: &[&str] = &[
    "trump", "biden", "president", "election", "congress", "senate", "democrat", "republican",
    "vote", "poll", "campaign", "governor", "mayor", "minister", "parliament", "government",
    "political",
];

pub const FINANCE_KEYWORDS: &[&str] = &[
    "stock", "market", "economy", "gdp", "inflation", "fed", "federal reserve", "dow", "nasdaq",
    "s&p", "trading", "price", "dollar", "euro", "bank",
];

pub const POP_CULTURE_KEYWORDS: &[&str] = &[
    "movie", "film", "album", "song", "artist", "celebrity", "award", "oscar", "grammy", "emmy",
    "netflix", "spotify", "box office",
];

pub const SCIENCE_KEYWORDS: &[&str] = &[
    "ai", "artificial intelligence", "robot", "space", "nasa", "spacex", "climate", "vaccine",
    "drug", "technology", "apple", "google", "microsoft", "tesla", "research", "scientific",
];

/// Keywords that map to one label
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl RuleSet {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn matches(&self, corpus: &str) -> bool {
        self.keywords.iter().any(|keyword| corpus.contains(keyword.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<RuleSet>,
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::with_rules(vec![
            RuleSet::new(Category::Sports, SPORTS_KEYWORDS),
            RuleSet::new(Category::Crypto, CRYPTO_KEYWORDS),
            RuleSet::new(Category::Politics, POLITICS_KEYWORDS),
            RuleSet::new(Category::Finance, FINANCE_KEYWORDS),
            RuleSet::new(Category::PopCulture, POP_CULTURE_KEYWORDS),
            RuleSet::new(Category::Science, SCIENCE_KEYWORDS),
        ])
    }
}

impl CategoryClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules are evaluated in the given order
    pub fn with_rules(rules: Vec<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RuleSet] {
        &self.rules
    }

    /// A confident existing label is returned unchanged; otherwise infer one
    pub fn classify<S: AsRef<str>>(&self, title: &str, existing: Option<&str>, tags: &[S]) -> String {
        match existing {
            Some(label) if label != Category::Uncategorized.as_str() => label.to_string(),
            _ => self.infer(title, tags).as_str().to_string(),
        }
    }

    /// First rule set with a substring hit in `title + " " + tags`
    pub fn infer<S: AsRef<str>>(&self, title: &str, tags: &[S]) -> Category {
        let corpus = search_corpus(title, tags);
        if corpus.trim().is_empty() {
            return Category::Uncategorized;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(&corpus))
            .map(|rule| rule.category)
            .unwrap_or(Category::Uncategorized)
    }
}

fn search_corpus<S: AsRef<str>>(title: &str, tags: &[S]) -> String {
    let tags: Vec<&str> = tags.iter().map(AsRef::as_ref).collect();
    format!("{} {}", title, tags.join(" ")).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_TAGS: [&str; 0] = [];

    #[test]
    fn test_first_matching_rule_wins() {
        let classifier = CategoryClassifier::new();
        assert_eq!(
            classifier.infer("NBA stock market prediction", &NO_TAGS),
            Category::Sports
        );
    }

    #[test]
    fn test_existing_label_is_kept() {
        let classifier = CategoryClassifier::new();
        assert_eq!(
            classifier.classify("Will bitcoin reach $200k?", Some("Politics"), &NO_TAGS),
            "Politics"
        );
        assert_eq!(
            classifier.classify("Will bitcoin reach $200k?", Some("Uncategorized"), &NO_TAGS),
            "Crypto"
        );
        assert_eq!(
            classifier.classify("Will bitcoin reach $200k?", None, &NO_TAGS),
            "Crypto"
        );
    }

    #[test]
    fn test_tags_contribute_to_corpus() {
        let classifier = CategoryClassifier::new();
        assert_eq!(
            classifier.infer("Who will be next?", &["Oscars", "Hollywood"]),
            Category::PopCulture
        );
    }

    #[test]
    fn test_substring_false_positives_are_preserved() {
        let classifier = CategoryClassifier::new();
        // "twin" contains "win"
        assert_eq!(classifier.infer("Twin Peaks reboot?", &NO_TAGS), Category::Sports);
        // "said" contains "ai"
        assert_eq!(classifier.infer("Who said it first?", &NO_TAGS), Category::Science);
    }

    #[test]
    fn test_empty_and_unmatched_are_uncategorized() {
        let classifier = CategoryClassifier::new();
        assert_eq!(classifier.infer("", &NO_TAGS), Category::Uncategorized);
        assert_eq!(classifier.infer("   ", &["  "]), Category::Uncategorized);
        assert_eq!(classifier.infer("Quiz", &NO_TAGS), Category::Uncategorized);
    }
}
