use std::sync::Arc;

use tiku_config::matching::MatchConfig;
use tiku_types::{MatchResult, MatchTier};

use crate::fuzzy::{ApproximateSearch, SearchOptions};
use crate::knowledge::Corpus;

/// Fewer keywords than this are never trusted, whatever the config asks for
pub const MIN_KEYWORDS: usize = 2;

fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FA5}').contains(&c)
}

/// Maximal runs of two or more CJK ideographs, in order of appearance
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    let mut run = String::new();
    let mut run_len = 0;

    for c in text.chars().chain(std::iter::once('\0')) {
        if is_cjk(c) {
            run.push(c);
            run_len += 1;
            continue;
        }
        if run_len >= 2 {
            keywords.push(std::mem::take(&mut run));
        } else {
            run.clear();
        }
        run_len = 0;
    }

    keywords
}

/// Three-tier lookup of normalized text against a corpus.
///
/// Tiers run strictly in order (substring, fuzzy, keyword overlap) and the
/// first hit wins; later tiers are not consulted.
pub struct MatchCascade {
    config: MatchConfig,
    search: Arc<dyn ApproximateSearch>,
}

impl MatchCascade {
    pub fn new(config: MatchConfig, search: Arc<dyn ApproximateSearch>) -> Self {
        Self { config, search }
    }

    pub fn resolve(&self, query: &str, corpus: &Corpus) -> Option<MatchResult> {
        if query.is_empty() || corpus.is_empty() {
            return None;
        }

        let (index, tier) = self
            .exact(query, corpus)
            .map(|i| (i, MatchTier::Exact))
            .or_else(|| self.fuzzy(query, corpus).map(|i| (i, MatchTier::Fuzzy)))
            .or_else(|| self.keyword(query, corpus).map(|i| (i, MatchTier::Keyword)))?;

        tracing::debug!(
            "{} match in {}: {}",
            tier.as_str(),
            corpus.category(),
            corpus.entries()[index].question
        );

        Some(MatchResult {
            entry: corpus.entries()[index].clone(),
            tier,
        })
    }

    fn exact(&self, query: &str, corpus: &Corpus) -> Option<usize> {
        (0..corpus.len()).find(|&i| {
            let question = corpus.normalized_question(i);
            // An empty question is a substring of everything
            !question.is_empty() && (query.contains(question) || question.contains(query))
        })
    }

    fn fuzzy(&self, query: &str, corpus: &Corpus) -> Option<usize> {
        let options = SearchOptions {
            index_threshold: self.config.index_threshold,
            min_match_char_len: self.config.min_match_char_len,
        };

        let best = self.search.search(corpus, query, &options).into_iter().next()?;
        tracing::debug!("Best fuzzy candidate #{} scored {:.3}", best.index, best.score);

        (best.score < self.config.accept_threshold && best.index < corpus.len())
            .then_some(best.index)
    }

    fn keyword(&self, query: &str, corpus: &Corpus) -> Option<usize> {
        let keywords = extract_keywords(query);
        if keywords.len() < self.config.min_keywords.max(MIN_KEYWORDS) {
            return None;
        }

        let required = ((keywords.len() as f64 * self.config.keyword_ratio).ceil() as usize).max(1);
        corpus.entries().iter().position(|entry| {
            let hits = keywords
                .iter()
                .filter(|k| entry.question.contains(k.as_str()))
                .count();
            hits >= required
        })
    }
}
