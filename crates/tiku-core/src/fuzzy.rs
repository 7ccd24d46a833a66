use crate::knowledge::Corpus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Candidates scoring above this are not returned at all
    pub index_threshold: f64,
    /// A candidate needs at least one shared run of this many characters
    pub min_match_char_len: usize,
}

/// One ranked hit; `score` is a dissimilarity in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub score: f64,
}

/// Approximate string search over the question text of a corpus
pub trait ApproximateSearch: Send + Sync {
    /// Candidates ranked ascending by dissimilarity, best first
    fn search(&self, corpus: &Corpus, query: &str, options: &SearchOptions) -> Vec<Candidate>;
}

/// Edit-distance search: scores every window of a question against the
/// query by Levenshtein error rate plus a small penalty for starting far from
/// the beginning of the question, and keeps the best window.
#[derive(Debug, Clone)]
pub struct FuzzySearch {
    /// Characters of offset that cost one full point of score
    pub location_distance: f64,
}

impl Default for FuzzySearch {
    fn default() -> Self {
        Self {
            location_distance: 100.0,
        }
    }
}

impl FuzzySearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best score of any window of `text`, if one stays within `max_score`
    fn score(&self, query: &str, query_len: usize, text: &[char], max_score: f64) -> Option<f64> {
        // Windows differing in length by more than this cost too many edits
        let max_errors = (max_score * query_len as f64 + 1e-9).floor() as usize;
        let min_len = query_len.saturating_sub(max_errors).max(1);
        let max_len = query_len + max_errors;

        let mut best: Option<f64> = None;
        for start in 0..text.len() {
            let proximity = start as f64 / self.location_distance;
            if proximity > max_score {
                break;
            }

            for len in min_len..=max_len {
                let Some(window) = text.get(start..start + len) else {
                    break;
                };
                let window: String = window.iter().collect();
                let errors = strsim::levenshtein(query, &window);
                let score = (errors as f64 / query_len as f64 + proximity).min(1.0);

                if score <= max_score && best.is_none_or(|b| score < b) {
                    best = Some(score);
                }
            }
        }

        best
    }
}

impl ApproximateSearch for FuzzySearch {
    fn search(&self, corpus: &Corpus, query: &str, options: &SearchOptions) -> Vec<Candidate> {
        let pattern: Vec<char> = query.chars().collect();
        if pattern.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate> = corpus
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let text: Vec<char> = entry.question.chars().collect();
                if longest_common_run(&pattern, &text) < options.min_match_char_len {
                    return None;
                }

                self.score(query, pattern.len(), &text, options.index_threshold)
                    .map(|score| Candidate { index, score })
            })
            .collect();

        // Stable: equal scores keep corpus order
        candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
        candidates
    }
}

fn longest_common_run(a: &[char], b: &[char]) -> usize {
    let mut best = 0;
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            best = best.max(cur[j + 1]);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}
