use crate::index::{DocStats, FieldIndex};
use std::cmp::Ordering;

/// BM25 parameters
pub struct BM25 {
    k1: f64,
    b: f64,
}

impl Default for BM25 {
    fn default() -> Self {
        Self {
            k1: 1.2, // Term frequency saturation parameter
            b: 0.75, // Length normalization parameter
        }
    }
}

impl BM25 {
    /// BM25 score of one field of a document
    pub fn score(&self, query_terms: &[String], doc_stats: &DocStats, index: &FieldIndex) -> f64 {
        let total_docs = index.total_documents() as f64;
        let avg_doc_length = index.avg_doc_length();
        let doc_length = doc_stats.length as f64;
        let mut score = 0.0;

        for term in query_terms {
            let tf = *doc_stats.term_frequencies.get(term).unwrap_or(&0) as f64;
            if tf == 0.0 {
                continue;
            }

            let doc_freq = index.doc_frequency(term) as f64;
            let idf = (1.0 + (total_docs - doc_freq + 0.5) / (doc_freq + 0.5)).ln();

            let length_norm = if avg_doc_length > 0.0 {
                1.0 - self.b + self.b * (doc_length / avg_doc_length)
            } else {
                1.0
            };

            score += idf * tf / (tf + self.k1 * length_norm);
        }

        score
    }
}

/// One field taking part in a multi-field match
pub struct WeightedField<'a> {
    pub index: &'a FieldIndex,
    pub boost: f64,
}

/// Ranked search result
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub doc_id: String,
    pub score: f64,
}

impl ScoredDocument {
    pub fn new(doc_id: String, score: f64) -> Self {
        Self { doc_id, score }
    }
}

/// Best-fields scoring: a document's score is its highest boosted field score
pub fn best_fields_score(query_terms: &[String], doc_id: &str, fields: &[WeightedField<'_>]) -> f64 {
    let bm25 = BM25::default();
    fields
        .iter()
        .filter_map(|field| {
            field
                .index
                .doc_stats(doc_id)
                .map(|stats| field.boost * bm25.score(query_terms, stats, field.index))
        })
        .fold(0.0, f64::max)
}

/// Rank every document matching any query term in any field
pub fn rank_documents(query_terms: &[String], fields: &[WeightedField<'_>]) -> Vec<ScoredDocument> {
    let mut candidates: Vec<String> = fields
        .iter()
        .flat_map(|field| field.index.search_or(query_terms))
        .collect();
    candidates.sort();
    candidates.dedup();

    let mut scored_docs: Vec<ScoredDocument> = candidates
        .into_iter()
        .map(|doc_id| {
            let score = best_fields_score(query_terms, &doc_id, fields);
            ScoredDocument::new(doc_id, score)
        })
        .collect();

    // Sort by score descending, ties by id
    scored_docs.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });

    scored_docs
}
