use crate::catalog::Item;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","between","both","but","by",
            "can","could","did","do","does","doing","down","during",
            "each","few","for","from","further","had","has","have","having",
            "he","her","here","hers","him","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","no","nor","not",
            "of","off","on","once","only","or","other","our","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","them","then","there","these","they","this","those","through","to","too",
            "under","until","up","very","was","we","were","what","when","where","which","while","who","whom","why","will","with",
            "would","you","your","yours",
        ];
        words.iter().copied().collect()
    };
}

/// Text signature an item is vectorized from: genre and name joined with a
/// space. Fields are required at ingestion, so there is nothing to skip here.
pub fn signature(item: &Item) -> String {
    format!("{} {}", item.genre, item.name)
}

/// Tokenize a signature: NFKC normalization, lowercase, stopword removal,
/// English stemming. Deterministic for identical input.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|token| !STOPWORDS.contains(token))
        .map(|token| STEMMER.stem(token).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_joins_genre_and_name() {
        let item = Item {
            id: 0,
            name: "Sholay".into(),
            genre: "Action".into(),
            language: "Hindi".into(),
            rating: Some(8.5),
            year: Some(1975),
        };
        assert_eq!(signature(&item), "Action Sholay");
    }

    #[test]
    fn basic_tokenize() {
        let t = tokenize("The Running of Runners");
        assert!(t.iter().any(|w| w == "run"));
        assert!(!t.iter().any(|w| w == "the"));
    }
}
