//! Side-by-side comparison of baseline and reranked answers over a question set.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use docqa_core::types::{Outcome, QueryRequest, SearchMode};

use crate::pipeline::QueryPipeline;

const ANSWER_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalQuestion {
    pub question: String,
}

pub fn load_questions(path: &Path) -> anyhow::Result<Vec<EvalQuestion>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading questions {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing questions {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvalCell {
    Answered { answer: String, source: String, score: f32 },
    Abstained { reason: String },
    Failed { message: String },
}

impl EvalCell {
    fn answer_text(&self) -> String {
        match self {
            EvalCell::Answered { answer, .. } => answer.clone(),
            EvalCell::Abstained { reason } => format!("**ABSTAINED**: {reason}"),
            EvalCell::Failed { message } => format!("Error: {message}"),
        }
    }

    fn source(&self) -> &str {
        match self {
            EvalCell::Answered { source, .. } => source,
            _ => "N/A",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalRow {
    pub question: String,
    pub baseline: EvalCell,
    pub reranked: EvalCell,
}

pub fn evaluate(pipeline: &QueryPipeline<'_>, questions: &[EvalQuestion], k: usize) -> Vec<EvalRow> {
    questions
        .iter()
        .map(|q| {
            info!(question = %q.question, "evaluating");
            EvalRow {
                question: q.question.clone(),
                baseline: run(pipeline, &q.question, k, SearchMode::Baseline),
                reranked: run(pipeline, &q.question, k, SearchMode::Reranked),
            }
        })
        .collect()
}

fn run(pipeline: &QueryPipeline<'_>, question: &str, k: usize, mode: SearchMode) -> EvalCell {
    match pipeline.ask(&QueryRequest::new(question, k, mode)) {
        Ok(response) => match response.outcome {
            Outcome::Answer(a) => EvalCell::Answered { answer: preview(&a.text), source: a.title, score: a.score },
            Outcome::Abstain(ab) => EvalCell::Abstained { reason: ab.reason() },
        },
        Err(e) => EvalCell::Failed { message: e.to_string() },
    }
}

/// Newlines flattened, trimmed, cut to the preview length, always followed by `...`.
fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let cut: String = flat.trim().chars().take(ANSWER_PREVIEW_CHARS).collect();
    format!("{cut}...")
}

pub fn render_markdown(rows: &[EvalRow]) -> String {
    let mut out = String::from(
        "| Question | Baseline Answer (Top Chunk) | Baseline Source | Reranked Answer (Top Chunk) | Reranked Source |\n\
         |---|---|---|---|---|\n",
    );
    for row in rows {
        let cells = [
            row.question.clone(),
            row.baseline.answer_text(),
            row.baseline.source().to_string(),
            row.reranked.answer_text(),
            row.reranked.source().to_string(),
        ];
        let escaped: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
        out.push_str(&format!("| {} |\n", escaped.join(" | ")));
    }
    out
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}
