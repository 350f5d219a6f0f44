//! Candle-backed sentence encoder.
//!
//! Tokenizes each batch with padding to the batch's longest sequence,
//! truncates at `max_length`, runs a BERT forward pass and mean-pools the
//! last hidden layer over the positions the attention mask marks as real.

use std::path::PathBuf;

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::info;

use klink_core::{EncoderConfig, KlinkError, Result};

use crate::SentenceEncoder;

/// Resolved locations of the three model files
struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: PathBuf,
}

impl ModelFiles {
    /// Local directory first, Hugging Face hub otherwise
    fn resolve(config: &EncoderConfig) -> Result<Self> {
        if let Some(dir) = &config.model_dir {
            return Ok(Self {
                config: dir.join("config.json"),
                tokenizer: dir.join("tokenizer.json"),
                weights: dir.join("model.safetensors"),
            });
        }

        let api = Api::new()
            .map_err(|e| KlinkError::EncodingError(format!("hub api init failed: {e}")))?;
        let repo = api.repo(Repo::with_revision(
            config.model_id.clone(),
            RepoType::Model,
            config.revision.clone(),
        ));

        let fetch = |file: &str| {
            repo.get(file).map_err(|e| {
                KlinkError::EncodingError(format!("failed to fetch {file}: {e}"))
            })
        };

        Ok(Self {
            config: fetch("config.json")?,
            tokenizer: fetch("tokenizer.json")?,
            weights: fetch("model.safetensors")?,
        })
    }
}

/// Sentence encoder over a pretrained BERT-style model
pub struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
    batch_size: usize,
}

impl BertEncoder {
    /// Load model weights and tokenizer once; the encoder is then a
    /// read-only handle safe to share across tasks.
    pub fn load(config: &EncoderConfig) -> Result<Self> {
        let files = ModelFiles::resolve(config)?;
        let device = Device::Cpu;

        let model_config: Config =
            serde_json::from_str(&std::fs::read_to_string(&files.config)?)?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| KlinkError::EncodingError(format!("tokenizer load failed: {e}")))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_length,
                ..Default::default()
            }))
            .map_err(|e| KlinkError::EncodingError(format!("tokenizer truncation: {e}")))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DTYPE, &device)
        }
        .map_err(|e| KlinkError::EncodingError(format!("weight load failed: {e}")))?;
        let model = BertModel::load(vb, &model_config)
            .map_err(|e| KlinkError::EncodingError(format!("model load failed: {e}")))?;

        info!(
            model = %config.model_id,
            hidden_size = model_config.hidden_size,
            max_length = config.max_length,
            "sentence encoder loaded"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension: model_config.hidden_size,
            batch_size: config.batch_size.max(1),
        })
    }

    /// One forward pass over up to `batch_size` texts
    fn forward_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let encodings = self
            .tokenizer
            .encode_batch(batch.to_vec(), true)
            .map_err(|e| KlinkError::EncodingError(format!("tokenization failed: {e}")))?;

        let ids = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()
            .and_then(|rows| Tensor::stack(&rows, 0))
            .map_err(|e| KlinkError::EncodingError(format!("input tensor: {e}")))?;

        let mask = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()
            .and_then(|rows| Tensor::stack(&rows, 0))
            .map_err(|e| KlinkError::EncodingError(format!("mask tensor: {e}")))?;

        let token_type_ids = ids
            .zeros_like()
            .map_err(|e| KlinkError::EncodingError(format!("type ids: {e}")))?;

        let hidden = self
            .model
            .forward(&ids, &token_type_ids, Some(&mask))
            .map_err(|e| KlinkError::EncodingError(format!("forward pass failed: {e}")))?;

        let pooled = mean_pool(&hidden, &mask)
            .map_err(|e| KlinkError::EncodingError(format!("pooling failed: {e}")))?;

        pooled
            .to_vec2::<f32>()
            .map_err(|e| KlinkError::EncodingError(format!("output extraction: {e}")))
    }
}

/// Mean-pool `[batch, seq, hidden]` states over the positions where
/// `mask` is non-zero; the denominator is clamped so an all-padding row
/// divides by epsilon instead of zero.
pub fn mean_pool(hidden: &Tensor, mask: &Tensor) -> candle_core::Result<Tensor> {
    let mask = mask.to_dtype(DType::F32)?;
    let expanded = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;

    let summed = (hidden * &expanded)?.sum(1)?;
    let counts = mask.sum_keepdim(1)?.maximum(1e-9)?;

    summed.broadcast_div(&counts)
}

#[async_trait]
impl SentenceEncoder for BertEncoder {
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.forward_batch(batch)?);
        }

        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// ============================================================================
// Tests
// ============================================================================
