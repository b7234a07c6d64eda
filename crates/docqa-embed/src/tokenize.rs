use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::{Tokenizer, TruncationParams};

/// Caps encodings at `max_len` tokens. The cap counts the special tokens the
/// post-processor adds, so a truncated encoding still ends in `[SEP]`.
pub fn configure_truncation(tokenizer: &mut Tokenizer, max_len: usize) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams { max_length: max_len, ..Default::default() }))
        .map_err(|e| anyhow!("Failed to set truncation to {} tokens: {}", max_len, e))?;
    Ok(())
}

/// Token ids and attention mask for a single text, shaped `[1, T]`.
pub fn tokenize_on_device(tokenizer: &Tokenizer, text: &str, device: &Device) -> Result<(Tensor, Tensor)> {
    let enc = tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let ids = enc.get_ids().to_vec();
    let mask = enc.get_attention_mask().to_vec();
    let len = ids.len();
    let input_ids = Tensor::from_iter(ids, device)?.reshape((1, len))?;
    let attention_mask = Tensor::from_iter(mask, device)?.reshape((1, len))?;
    Ok((input_ids, attention_mask))
}
