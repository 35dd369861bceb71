//! Fallback chain resolution.
//!
//! Every lookup walks an ordered chain of languages ending at the default.
//! Regional variants the bot ships resources for get baked-in tails; any
//! other language falls straight back to the default.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::I18nError;

/// Produces the ordered language chain tried for every lookup.
#[derive(Debug)]
pub struct FallbackResolver {
    default_lang: String,
    /// Configured tails, not including the language itself or (necessarily)
    /// the default.
    chains: RwLock<HashMap<String, Vec<String>>>,
}

impl FallbackResolver {
    pub fn new(default_lang: &str) -> Self {
        let mut chains: HashMap<String, Vec<String>> = HashMap::new();
        chains.insert("pt_BR".to_string(), vec!["pt".to_string()]);
        chains.insert("es_MX".to_string(), vec!["es".to_string()]);
        chains.insert("zh_CN".to_string(), vec!["zh".to_string()]);
        chains.insert("zh_TW".to_string(), vec!["zh".to_string()]);
        chains.insert("en_US".to_string(), Vec::new());

        Self {
            default_lang: default_lang.to_string(),
            chains: RwLock::new(chains),
        }
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    /// Replace the configured tail for `lang`. The language itself is
    /// always tried first and must not appear in the tail.
    pub fn set_chain(&self, lang: &str, tail: &[&str]) {
        let tail: Vec<String> = tail.iter().map(|t| t.to_string()).collect();
        self.chains
            .write()
            .expect("fallback chains lock poisoned")
            .insert(lang.to_string(), tail);
    }

    /// The chain `[lang, …, default]`: starts at `lang`, ends at the
    /// default language, contains no duplicates.
    ///
    /// A tail that would revisit a language is truncated at the first
    /// repeat; the cycle is reported as `RecursiveFallback` alongside the
    /// usable chain.
    pub fn chain(&self, lang: &str) -> (Vec<String>, Option<I18nError>) {
        if lang == self.default_lang {
            return (vec![self.default_lang.clone()], None);
        }

        let mut chain = vec![lang.to_string()];
        let mut cycle = None;

        let tail = self
            .chains
            .read()
            .expect("fallback chains lock poisoned")
            .get(lang)
            .cloned()
            .unwrap_or_default();

        for next in tail {
            if chain.contains(&next) {
                cycle = Some(I18nError::RecursiveFallback(lang.to_string()));
                break;
            }
            chain.push(next);
        }

        if cycle.is_none() && !chain.contains(&self.default_lang) {
            chain.push(self.default_lang.clone());
        }

        (chain, cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(resolver: &FallbackResolver, lang: &str) -> Vec<String> {
        resolver.chain(lang).0
    }

    #[test]
    fn test_baked_in_regional_tails() {
        let resolver = FallbackResolver::new("en");
        assert_eq!(chain_of(&resolver, "pt_BR"), vec!["pt_BR", "pt", "en"]);
        assert_eq!(chain_of(&resolver, "es_MX"), vec!["es_MX", "es", "en"]);
        assert_eq!(chain_of(&resolver, "zh_CN"), vec!["zh_CN", "zh", "en"]);
        assert_eq!(chain_of(&resolver, "zh_TW"), vec!["zh_TW", "zh", "en"]);
        assert_eq!(chain_of(&resolver, "en_US"), vec!["en_US", "en"]);
    }

    #[test]
    fn test_unknown_language_falls_to_default() {
        let resolver = FallbackResolver::new("en");
        assert_eq!(chain_of(&resolver, "fi"), vec!["fi", "en"]);
    }

    #[test]
    fn test_default_language_chain_is_itself() {
        let resolver = FallbackResolver::new("en");
        assert_eq!(chain_of(&resolver, "en"), vec!["en"]);
    }

    #[test]
    fn test_configured_tail_containing_default_not_doubled() {
        let resolver = FallbackResolver::new("en");
        resolver.set_chain("gl", &["pt", "en"]);
        assert_eq!(chain_of(&resolver, "gl"), vec!["gl", "pt", "en"]);
    }

    #[test]
    fn test_cycle_truncated_and_reported() {
        let resolver = FallbackResolver::new("en");
        resolver.set_chain("a", &["b", "a", "c"]);
        let (chain, cycle) = resolver.chain("a");
        assert_eq!(chain, vec!["a", "b"]);
        assert_eq!(cycle, Some(I18nError::RecursiveFallback("a".to_string())));
    }

    #[test]
    fn test_self_referencing_tail_truncates_immediately() {
        let resolver = FallbackResolver::new("en");
        resolver.set_chain("x", &["x"]);
        let (chain, cycle) = resolver.chain("x");
        assert_eq!(chain, vec!["x"]);
        assert!(cycle.is_some());
    }

    #[test]
    fn test_chain_properties_hold_for_overrides() {
        let resolver = FallbackResolver::new("en");
        resolver.set_chain("sr_Latn", &["sr", "hr"]);
        let chain = chain_of(&resolver, "sr_Latn");
        assert_eq!(chain.first().map(String::as_str), Some("sr_Latn"));
        assert_eq!(chain.last().map(String::as_str), Some("en"));
        let mut deduped = chain.clone();
        deduped.dedup();
        assert_eq!(deduped, chain);
    }
}
