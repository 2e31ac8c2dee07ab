use unicode_segmentation::UnicodeSegmentation;

/// Standard analyzer: Unicode word boundaries followed by lowercasing.
/// No stopwords and no stemming, matching the engine's default for `text` fields.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Split text on word boundaries
    fn tokenize<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> {
        text.unicode_words()
    }

    /// Full analysis pipeline
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.tokenize(text).map(|t| t.to_lowercase()).collect()
    }
}
