use engine::tokenizer::tokenize;

#[test]
fn it_normalizes_and_stems() {
    let toks = tokenize("Running Runners RUN! The café scene.");
    assert!(toks.contains(&"run".to_string()));
    // Unicode normalization keeps accented names searchable.
    assert!(toks.iter().any(|w| w.starts_with("caf")));
}

#[test]
fn it_filters_stopwords() {
    let toks = tokenize("The Lord of the Rings and the Hobbit");
    assert!(!toks.contains(&"the".to_string()));
    assert!(!toks.contains(&"and".to_string()));
    assert!(!toks.contains(&"of".to_string()));
}

#[test]
fn identical_input_tokenizes_identically() {
    let text = "Action Andaz Apna Apna";
    assert_eq!(tokenize(text), tokenize(text));
}
