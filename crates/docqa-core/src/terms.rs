//! Term analysis shared by the keyword index tokenizer and the hashing embedder.

pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "or", "but", "not", "this",
    "these", "they", "them", "their", "there", "then", "than", "so", "if", "when", "where", "why",
    "how", "what", "which", "who", "whom", "whose", "can", "could", "should", "would", "may",
    "might", "must", "shall", "do", "does", "did", "have", "had", "having",
];

pub fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.contains(&term)
}

/// Lowercased alphanumeric terms of `text` with stop words removed, in order.
pub fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !is_stop_word(t))
        .collect()
}
