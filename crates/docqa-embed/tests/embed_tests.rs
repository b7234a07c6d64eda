use std::path::Path;

use docqa_core::config::{EmbeddingBackend, EmbeddingSettings};
use docqa_embed::{embedder_from_settings, HashingEmbedder};

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn hashing_embedder_shapes_and_determinism() {
    let settings = EmbeddingSettings { backend: EmbeddingBackend::Hashing, hashing_dim: 64, ..Default::default() };
    let embedder = embedder_from_settings(&settings, Path::new("does/not/matter")).expect("embedder");
    assert_eq!(embedder.dim(), 64);
    assert_eq!(embedder.embedder_id(), "hashing:d64");

    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];
    assert_eq!(v1.len(), 64);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn shared_terms_raise_similarity() {
    let e = HashingEmbedder::new(384);
    let q = e.embed_text("What is machine guarding?");
    let related = e.embed_text("Machine guarding protects workers from moving machine parts.");
    let unrelated = e.embed_text("Boil the pasta in salted water.");
    assert!(cosine(&q, &related) > 0.4);
    assert!(cosine(&q, &related) > cosine(&q, &unrelated));
}

#[test]
fn text_without_content_words_is_the_zero_vector() {
    let e = HashingEmbedder::new(16);
    assert!(e.embed_text("what is the").iter().all(|x| *x == 0.0));
}

#[test]
fn bert_backend_reports_missing_model_dir() {
    let tmp = tempfile::TempDir::new().expect("tmp");
    let settings = EmbeddingSettings::default();
    assert!(embedder_from_settings(&settings, &tmp.path().join("missing")).is_err());
}
