use docqa_core::traits::KeywordIndex;
use docqa_text::{TantivyKeywordIndex, UnavailableKeywordIndex};
use tempfile::TempDir;

fn seed(index: &mut TantivyKeywordIndex) {
    let chunks = [
        ("mg-0", "Machine guarding protects workers from moving machine parts."),
        ("mg-1", "A guard must prevent contact with the point of operation."),
        ("lo-0", "Lockout procedures isolate energy before maintenance."),
        ("ppe-0", "Gloves and goggles are personal protective equipment."),
        ("exit-0", "Workers must find their way out. The best exit route is posted."),
    ];
    for (id, text) in chunks {
        index.add(id, text).expect("add");
    }
    index.commit().expect("commit");
}

#[test]
fn tantivy_full_flow() {
    let tmp = TempDir::new().expect("tmp");
    let dir = tmp.path().join("tantivy");
    let mut index = TantivyKeywordIndex::create(dir.clone()).expect("create");
    seed(&mut index);
    assert_eq!(index.num_docs().expect("num_docs"), 5);

    let hits = index.search("What is machine guarding?", None).expect("search");
    assert!(hits.contains_key("mg-0"));
    assert!(!hits.contains_key("lo-0"));
    assert!(!hits.contains_key("ppe-0"));
    assert!(hits.values().all(|s| *s > 0.0));

    // reopening from disk sees the committed documents
    let reopened = TantivyKeywordIndex::open(dir).expect("open");
    let again = reopened.search("machine guarding", None).expect("search");
    assert_eq!(again.len(), hits.len());
}

#[test]
fn search_is_restricted_to_candidates() {
    let mut index = TantivyKeywordIndex::in_memory().expect("index");
    seed(&mut index);

    let candidates = vec!["mg-1".to_string(), "lo-0".to_string()];
    let hits = index.search("guard contact", Some(candidates.as_slice())).expect("search");
    assert!(hits.contains_key("mg-1"));
    assert!(!hits.contains_key("lo-0"), "candidate without a match is absent");

    let hits = index.search("machine guarding", Some(candidates.as_slice())).expect("search");
    assert!(!hits.contains_key("mg-0"), "non-candidate must not be scored");
    assert!(hits.is_empty());

    // the filter clause adds nothing to the text score
    let all = index.search("guard contact", None).expect("search");
    let restricted = index.search("guard contact", Some(candidates.as_slice())).expect("search");
    assert!((all["mg-1"] - restricted["mg-1"]).abs() < 1e-5);
}

#[test]
fn stop_words_and_syntax_never_match_or_fail() {
    let mut index = TantivyKeywordIndex::in_memory().expect("index");
    seed(&mut index);
    assert!(index.search("what is the", None).expect("search").is_empty());
    assert!(index.search("\"machine: *guarding^ (AND OR", None).expect("search").contains_key("mg-0"));
    assert!(index.search("machine", Some(&[][..])).expect("search").is_empty());
    assert!(index.search("pasta recipes", None).expect("search").is_empty());
}

#[test]
fn partial_term_overlap_is_not_a_match() {
    let mut index = TantivyKeywordIndex::in_memory().expect("index");
    seed(&mut index);
    // "best" and "way" occur in exit-0, "cook" and "pasta" do not
    assert!(index.search("What is the best way to cook pasta?", None).expect("search").is_empty());
    assert!(index.search("machine operation", None).expect("search").is_empty());
    let hits = index.search("best exit route", None).expect("search");
    assert_eq!(hits.keys().collect::<Vec<_>>(), vec!["exit-0"]);
}

#[test]
fn unavailable_index_always_errors() {
    let mut index = UnavailableKeywordIndex::new("tantivy directory missing");
    assert!(index.search("machine", None).is_err());
    let err = index.add("a", "b").expect_err("add");
    assert!(format!("{err:#}").contains("tantivy directory missing"));
}
