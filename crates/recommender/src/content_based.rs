//! Content-based filtering
//!
//! Builds a TF-IDF vector per product from its category and description and
//! ranks products by cosine similarity to a seed product.

use crate::catalog::CatalogIndex;
use crate::types::{ModelOutcome, ProductId, UnavailableReason};
use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use storefront_core::math::{cosine_similarity, normalize_vector};

/// Tokens of two or more word characters
static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("Failed to compile token regex"));

/// Fixed English stopword list
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "do", "does", "done", "down",
    "due", "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc", "even",
    "ever", "every", "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "get", "give", "go", "had", "has", "have", "he", "hence",
    "her", "here", "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his",
    "how", "however", "ie", "if", "in", "inc", "indeed", "into", "is", "it", "its", "itself",
    "just", "keep", "last", "latter", "least", "less", "ltd", "made", "many", "may", "me",
    "meanwhile", "might", "more", "moreover", "most", "mostly", "much", "must", "my", "myself",
    "namely", "neither", "never", "nevertheless", "next", "no", "nobody", "none", "noone",
    "nor", "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one",
    "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
    "over", "own", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
    "seemed", "seeming", "seems", "several", "she", "should", "since", "so", "some",
    "somehow", "someone", "something", "sometime", "sometimes", "somewhere", "still", "such",
    "than", "that", "the", "their", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they", "this",
    "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
    "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
    "well", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
    "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
    "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
    "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

static STOP_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

/// Lowercased, stopword-filtered tokens of `text`
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_REGEX
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// TF-IDF vector space over the catalog
///
/// Row `i` is the L2-normalised vector of the product at catalog position `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentModel {
    vocabulary: Vec<String>,
    vectors: Array2<f32>,
}

impl ContentModel {
    /// Build the vector space, keeping the `max_features` most frequent terms
    ///
    /// Returns `None` when the corpus reduces to zero terms.
    pub fn build(catalog: &CatalogIndex, max_features: usize) -> Option<Self> {
        let documents: Vec<Vec<String>> = catalog
            .content_corpus()
            .iter()
            .map(|text| tokenize(text))
            .collect();

        // term -> (corpus frequency, document frequency)
        let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for doc in &documents {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in doc {
                let entry = stats.entry(token.as_str()).or_insert((0, 0));
                entry.0 += 1;
                if seen.insert(token.as_str()) {
                    entry.1 += 1;
                }
            }
        }

        if stats.is_empty() {
            return None;
        }

        // Most frequent first, ties alphabetical (BTreeMap order + stable sort)
        let mut ranked: Vec<(&str, (usize, usize))> = stats.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));
        ranked.truncate(max_features);
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        let n_docs = documents.len() as f32;
        let columns: HashMap<&str, usize> = ranked
            .iter()
            .enumerate()
            .map(|(col, (term, _))| (*term, col))
            .collect();
        let idf: Vec<f32> = ranked
            .iter()
            .map(|(_, (_, df))| ((1.0 + n_docs) / (1.0 + *df as f32)).ln() + 1.0)
            .collect();

        let mut vectors = Array2::<f32>::zeros((documents.len(), ranked.len()));
        for (row, doc) in documents.iter().enumerate() {
            for token in doc {
                if let Some(&col) = columns.get(token.as_str()) {
                    vectors[[row, col]] += 1.0;
                }
            }
            let mut weights: Vec<f32> = vectors
                .row(row)
                .iter()
                .zip(idf.iter())
                .map(|(tf, idf)| tf * idf)
                .collect();
            normalize_vector(&mut weights);
            for (col, weight) in weights.into_iter().enumerate() {
                vectors[[row, col]] = weight;
            }
        }

        Some(Self {
            vocabulary: ranked.into_iter().map(|(term, _)| term.to_string()).collect(),
            vectors,
        })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vectors(&self) -> &Array2<f32> {
        &self.vectors
    }

    /// Cosine similarity between two catalog positions
    ///
    /// A product with any terms has similarity 1.0 with itself; a product
    /// without terms is 0.0 against everything.
    pub fn similarity(&self, a: usize, b: usize) -> f32 {
        let row_a = self.vectors.row(a);
        let row_b = self.vectors.row(b);
        match (row_a.as_slice(), row_b.as_slice()) {
            (Some(x), Some(y)) => cosine_similarity(x, y),
            _ => row_a.dot(&row_b),
        }
    }

    /// Products most similar to `product_id`, excluding the seed itself
    ///
    /// Ties keep catalog order.
    pub fn similar_to(&self, catalog: &CatalogIndex, product_id: &str, limit: usize) -> ModelOutcome {
        let Some(seed) = catalog.position(product_id) else {
            return ModelOutcome::Unavailable(UnavailableReason::UnknownProduct);
        };

        let mut scored: Vec<(usize, f32)> = (0..self.vectors.nrows())
            .filter(|&pos| pos != seed)
            .map(|pos| (pos, self.similarity(seed, pos)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let ranked: Vec<ProductId> = scored
            .into_iter()
            .take(limit)
            .filter_map(|(pos, _)| catalog.at(pos).map(|p| p.id.clone()))
            .collect();

        if ranked.is_empty() {
            ModelOutcome::Unavailable(UnavailableReason::NoCandidates)
        } else {
            ModelOutcome::Ranked(ranked)
        }
    }
}
