use docqa_core::traits::VectorIndex;
use docqa_vector::{LanceVectorIndex, MemoryVectorIndex};
use tempfile::TempDir;

fn entries() -> Vec<(String, Vec<f32>)> {
    vec![
        ("a-0".to_string(), vec![1.0, 0.0, 0.0, 0.0]),
        ("b-0".to_string(), vec![0.8, 0.6, 0.0, 0.0]),
        ("c-0".to_string(), vec![0.0, 0.0, 1.0, 0.0]),
    ]
}

#[test]
fn lancedb_full_flow() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("lancedb");
    let mut index = LanceVectorIndex::create(&db_path, "chunks", 4).expect("create");
    assert_eq!(index.len().expect("len"), 0);
    assert!(index.query(&[1.0, 0.0, 0.0, 0.0], 3).expect("query").is_empty());

    index.add_batch(&entries()).expect("add");
    assert_eq!(index.len().expect("len"), 3);

    let hits = index.query(&[1.0, 0.0, 0.0, 0.0], 2).expect("query");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0, "a-0");
    assert_eq!(hits[1].0, "b-0");
    assert!((hits[0].1 - 1.0).abs() < 1e-4);
    assert!((hits[1].1 - 0.8).abs() < 1e-4);

    drop(index);
    let reopened = LanceVectorIndex::open(&db_path, "chunks", 4).expect("open");
    assert_eq!(reopened.len().expect("len"), 3);
    let hits = reopened.query(&[0.0, 0.0, 1.0, 0.0], 1).expect("query");
    assert_eq!(hits[0].0, "c-0");
}

#[test]
fn lancedb_rejects_wrong_dimension_and_missing_dir() {
    let tmp = TempDir::new().expect("tmp");
    let mut index = LanceVectorIndex::create(&tmp.path().join("db"), "chunks", 4).expect("create");
    assert!(index.add("x-0", &[1.0, 2.0]).is_err());
    assert!(index.query(&[1.0], 1).is_err());
    assert!(LanceVectorIndex::open(&tmp.path().join("absent"), "chunks", 4).is_err());
}

#[test]
fn memory_index_orders_by_cosine_with_stable_ties() {
    let mut index = MemoryVectorIndex::new();
    index.add_batch(&entries()).expect("add");
    index.add("a-1", &[2.0, 0.0, 0.0, 0.0]).expect("add");
    index.add("z-0", &[0.0, 0.0, 0.0, 0.0]).expect("add");

    let hits = index.query(&[3.0, 0.0, 0.0, 0.0], 10).expect("query");
    let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
    // a-0 and a-1 tie at 1.0 and keep insertion order; the zero vector is skipped
    assert_eq!(ids, vec!["a-0", "a-1", "b-0", "c-0"]);
    assert!((hits[2].1 - 0.8).abs() < 1e-6);
    assert!(hits[3].1.abs() < 1e-6);

    assert_eq!(index.query(&[1.0, 0.0, 0.0, 0.0], 1).expect("query").len(), 1);
    assert!(index.query(&[0.0; 4], 5).expect("query").is_empty());
    assert!(index.add("bad", &[1.0]).is_err());
}

#[test]
fn memory_index_rejects_query_of_wrong_dimension() {
    assert!(MemoryVectorIndex::new().query(&[1.0], 3).expect("empty index").is_empty());

    let mut index = MemoryVectorIndex::new();
    index.add_batch(&entries()).expect("add");
    assert!(index.query(&[1.0], 3).is_err());
    assert!(index.query(&[1.0, 0.0, 0.0, 0.0, 0.0], 3).is_err());

    let fixed = MemoryVectorIndex::with_dim(4);
    assert!(fixed.query(&[1.0, 0.0], 1).is_err());
}
