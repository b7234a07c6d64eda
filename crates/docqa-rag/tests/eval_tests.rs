mod common;

use common::Fixture;
use docqa_rag::{evaluate, load_questions, render_markdown, EvalCell, EvalQuestion, EvalRow, PipelineSettings};

#[test]
fn evaluation_compares_both_modes() {
    let fx = Fixture::new();
    let pipeline = fx.pipeline(PipelineSettings::default());
    let questions = vec![
        EvalQuestion { question: "What is machine guarding?".into() },
        EvalQuestion { question: "What is the best way to cook pasta?".into() },
    ];
    let rows = evaluate(&pipeline, &questions, 1);
    assert_eq!(rows.len(), 2);

    match &rows[0].reranked {
        EvalCell::Answered { answer, source, .. } => {
            assert_eq!(source, "Machine Guarding Basics");
            assert!(answer.ends_with("..."));
            assert!(answer.chars().count() <= 103);
            assert!(!answer.contains('\n'));
        }
        other => panic!("expected an answer, got {other:?}"),
    }
    assert!(matches!(rows[1].baseline, EvalCell::Abstained { .. }));
    assert!(matches!(rows[1].reranked, EvalCell::Abstained { .. }));

    let table = render_markdown(&rows);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(
        lines[0],
        "| Question | Baseline Answer (Top Chunk) | Baseline Source | Reranked Answer (Top Chunk) | Reranked Source |"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[3].contains("**ABSTAINED**: Top result score ("));
    assert!(lines[3].ends_with("| N/A |"));
}

#[test]
fn markdown_escapes_pipes_and_renders_errors() {
    let rows = vec![EvalRow {
        question: "a | b?".into(),
        baseline: EvalCell::Failed { message: "Invalid input: k must be >= 1".into() },
        reranked: EvalCell::Answered { answer: "short...".into(), source: "Doc".into(), score: 0.9 },
    }];
    let table = render_markdown(&rows);
    let row = table.lines().nth(2).expect("row");
    assert_eq!(row, "| a \\| b? | Error: Invalid input: k must be >= 1 | N/A | short... | Doc |");
}

#[test]
fn questions_file_is_a_json_array() {
    let tmp = tempfile::TempDir::new().expect("tmp");
    let path = tmp.path().join("questions.json");
    std::fs::write(&path, r#"[{"question": "What is lockout?"}, {"question": "Why wear gloves?"}]"#).expect("write");
    let questions = load_questions(&path).expect("load");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[1].question, "Why wear gloves?");
    assert!(load_questions(&tmp.path().join("missing.json")).is_err());
}
