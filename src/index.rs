use std::collections::{HashMap, HashSet};

/// Per-document statistics for BM25 ranking
#[derive(Debug, Clone, PartialEq)]
pub struct DocStats {
    pub length: usize,
    pub term_frequencies: HashMap<String, usize>,
}

/// Inverted index over a single text field: token -> document IDs
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    postings: HashMap<String, HashSet<String>>,
    docs: HashMap<String, DocStats>,
    total_length: usize,
}

impl FieldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document's analyzed tokens to the index
    pub fn add_document(&mut self, doc_id: &str, tokens: &[String]) {
        let mut term_frequencies = HashMap::new();
        for token in tokens {
            *term_frequencies.entry(token.clone()).or_insert(0) += 1;
        }

        for token in term_frequencies.keys() {
            self.postings
                .entry(token.clone())
                .or_default()
                .insert(doc_id.to_string());
        }

        self.total_length += tokens.len();
        self.docs.insert(
            doc_id.to_string(),
            DocStats {
                length: tokens.len(),
                term_frequencies,
            },
        );
    }

    /// Remove a document from the index
    pub fn remove_document(&mut self, doc_id: &str) {
        let Some(stats) = self.docs.remove(doc_id) else {
            return;
        };

        self.total_length -= stats.length;
        for token in stats.term_frequencies.keys() {
            if let Some(ids) = self.postings.get_mut(token) {
                ids.remove(doc_id);
                if ids.is_empty() {
                    self.postings.remove(token);
                }
            }
        }
    }

    /// Number of documents containing a term (for IDF calculation)
    pub fn doc_frequency(&self, token: &str) -> usize {
        self.postings.get(token).map(|ids| ids.len()).unwrap_or(0)
    }

    /// Number of documents that have a value for this field
    pub fn total_documents(&self) -> usize {
        self.docs.len()
    }

    pub fn avg_doc_length(&self) -> f64 {
        if self.docs.is_empty() {
            0.0
        } else {
            self.total_length as f64 / self.docs.len() as f64
        }
    }

    pub fn doc_stats(&self, doc_id: &str) -> Option<&DocStats> {
        self.docs.get(doc_id)
    }

    /// Documents matching ANY token (OR query)
    pub fn search_or(&self, tokens: &[String]) -> HashSet<String> {
        let mut result = HashSet::new();
        for token in tokens {
            if let Some(ids) = self.postings.get(token) {
                result.extend(ids.iter().cloned());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_add_and_search() {
        let mut index = FieldIndex::new();
        index.add_document("1", &tokens(&["dune", "messiah"]));
        index.add_document("2", &tokens(&["children", "of", "dune"]));

        assert_eq!(index.doc_frequency("dune"), 2);
        assert_eq!(index.total_documents(), 2);
        assert_eq!(index.avg_doc_length(), 2.5);

        let hits = index.search_or(&tokens(&["messiah", "children"]));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_readd_replaces_terms() {
        let mut index = FieldIndex::new();
        index.add_document("1", &tokens(&["dune"]));
        index.remove_document("1");
        index.add_document("1", &tokens(&["hyperion", "hyperion"]));

        assert_eq!(index.doc_frequency("dune"), 0);
        assert_eq!(index.doc_frequency("hyperion"), 1);
        assert_eq!(index.total_documents(), 1);
        assert_eq!(
            index.doc_stats("1").and_then(|s| s.term_frequencies.get("hyperion")),
            Some(&2)
        );
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut index = FieldIndex::new();
        index.remove_document("nope");
        assert_eq!(index.total_documents(), 0);
    }
}
