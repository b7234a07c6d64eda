use std::str::FromStr;

use candle_core::Device;
use docqa_embed::tokenize::{configure_truncation, tokenize_on_device};
use tokenizers::Tokenizer;

const WORD_LEVEL: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [],
  "normalizer": null,
  "pre_tokenizer": { "type": "Whitespace" },
  "post_processor": { "type": "BertProcessing", "sep": ["[SEP]", 3], "cls": ["[CLS]", 2] },
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": { "[UNK]": 0, "[PAD]": 1, "[CLS]": 2, "[SEP]": 3, "machine": 4, "guarding": 5 },
    "unk_token": "[UNK]"
  }
}"#;

#[test]
fn truncated_encoding_keeps_special_tokens() {
    let mut tokenizer = Tokenizer::from_str(WORD_LEVEL).expect("tokenizer");
    configure_truncation(&mut tokenizer, 4).expect("truncation");

    let (ids, mask) =
        tokenize_on_device(&tokenizer, "machine guarding machine guarding machine", &Device::Cpu).expect("tokenize");
    assert_eq!(ids.dims(), &[1, 4]);
    assert_eq!(ids.to_vec2::<u32>().expect("ids"), vec![vec![2, 4, 5, 3]]);
    assert_eq!(mask.to_vec2::<u32>().expect("mask"), vec![vec![1, 1, 1, 1]]);
}

#[test]
fn short_text_is_not_padded_or_cut() {
    let mut tokenizer = Tokenizer::from_str(WORD_LEVEL).expect("tokenizer");
    configure_truncation(&mut tokenizer, 16).expect("truncation");

    let (ids, _) = tokenize_on_device(&tokenizer, "guarding", &Device::Cpu).expect("tokenize");
    assert_eq!(ids.to_vec2::<u32>().expect("ids"), vec![vec![2, 5, 3]]);
}
