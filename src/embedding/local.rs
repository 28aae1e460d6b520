//! all-MiniLM-L6-v2 over ONNX Runtime.
//!
//! Texts are tokenized in bounded chunks, run through the model, mean-pooled
//! over the attention mask and L2-normalized, so cosine similarity between
//! two outputs reduces to a dot product.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ndarray::{Array1, ArrayView2, ArrayView3, Axis};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Encoding, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use super::{EmbeddingProvider, EMBEDDING_DIM};
use crate::config::{expand_tilde, EmbeddingConfig};

/// Sequence length the model was trained at.
const MAX_SEQ_LEN: usize = 256;

/// Texts per inference call. Search reranks whole BFS frontiers, which can be large.
const INFERENCE_CHUNK: usize = 32;

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

pub struct LocalEmbeddingProvider {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

// Safety: Tokenizer is Send+Sync and every use of Session goes through the Mutex.
unsafe impl Send for LocalEmbeddingProvider {}
unsafe impl Sync for LocalEmbeddingProvider {}

/// Where the model and tokenizer live for `config`.
pub fn model_files(config: &EmbeddingConfig) -> (PathBuf, PathBuf) {
    let dir = expand_tilde(&config.cache_dir);
    (dir.join(MODEL_FILE), dir.join(TOKENIZER_FILE))
}

impl LocalEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let (model_path, tokenizer_path) = model_files(config);

        for path in [&model_path, &tokenizer_path] {
            anyhow::ensure!(
                path.exists(),
                "{} not found. Run `memweave model download` first.",
                path.display()
            );
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&model_path)
            .context("failed to load ONNX model")?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("failed to set truncation: {e}"))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        tracing::info!(
            model = %config.model,
            path = %model_path.display(),
            "embedding model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    fn embed_chunk(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;
        let inputs = EncodedBatch::from_encodings(&encodings);

        let shape = vec![inputs.rows as i64, inputs.cols as i64];
        let input_ids = Tensor::from_array((shape.clone(), inputs.ids.into_boxed_slice()))?;
        let attention_mask =
            Tensor::from_array((shape.clone(), inputs.mask.clone().into_boxed_slice()))?;
        let token_type_ids = Tensor::from_array((
            shape,
            vec![0i64; inputs.rows * inputs.cols].into_boxed_slice(),
        ))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs! {
            "input_ids" => input_ids,
            "attention_mask" => attention_mask,
            "token_type_ids" => token_type_ids,
        })?;

        // Export names differ between conversions of the same model.
        let hidden = outputs
            .get("token_embeddings")
            .or_else(|| outputs.get("last_hidden_state"))
            .unwrap_or_else(|| &outputs[0]);
        let (dims, data) = hidden
            .try_extract_tensor::<f32>()
            .context("failed to extract token embeddings")?;

        let dims: &[i64] = dims;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] as usize == inputs.rows && dims[2] == EMBEDDING_DIM as i64,
            "unexpected token embedding shape {dims:?}, expected [{}, seq, {EMBEDDING_DIM}]",
            inputs.rows
        );
        let seq = dims[1] as usize;
        anyhow::ensure!(
            seq <= inputs.cols,
            "model returned {seq} positions for {} input tokens",
            inputs.cols
        );

        let tokens = ArrayView3::from_shape((inputs.rows, seq, EMBEDDING_DIM), data)
            .context("token embeddings are not contiguous")?;
        let mask = ArrayView2::from_shape((inputs.rows, inputs.cols), &inputs.mask)
            .context("attention mask shape mismatch")?;

        Ok(tokens
            .outer_iter()
            .zip(mask.outer_iter())
            .map(|(row, row_mask)| {
                let pooled = mean_pool(row, row_mask.as_slice().unwrap_or(&[]));
                l2_normalize(pooled).to_vec()
            })
            .collect())
    }
}

/// Flattened `[rows, cols]` token ids and attention mask.
struct EncodedBatch {
    rows: usize,
    cols: usize,
    ids: Vec<i64>,
    mask: Vec<i64>,
}

impl EncodedBatch {
    fn from_encodings(encodings: &[Encoding]) -> Self {
        let rows = encodings.len();
        let cols = encodings.first().map_or(0, |e| e.get_ids().len());
        let mut ids = Vec::with_capacity(rows * cols);
        let mut mask = Vec::with_capacity(rows * cols);
        for encoding in encodings {
            ids.extend(encoding.get_ids().iter().map(|&id| id as i64));
            mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
        }
        Self {
            rows,
            cols,
            ids,
            mask,
        }
    }
}

/// Average of the token vectors whose mask entry is set.
fn mean_pool(tokens: ArrayView2<'_, f32>, mask: &[i64]) -> Array1<f32> {
    let mut sum = Array1::<f32>::zeros(tokens.ncols());
    let mut count = 0.0f32;
    for (position, token) in tokens.axis_iter(Axis(0)).enumerate() {
        if mask.get(position).copied().unwrap_or(0) > 0 {
            sum += &token;
            count += 1.0;
        }
    }
    if count > 0.0 {
        sum /= count;
    }
    sum
}

/// Scale to unit length. A zero vector is returned unchanged.
fn l2_normalize(mut v: Array1<f32>) -> Array1<f32> {
    let norm = v.dot(&v).sqrt();
    if norm > 0.0 {
        v /= norm;
    }
    v
}

impl EmbeddingProvider for LocalEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_chunk(&[text])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("model returned no embedding"))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(INFERENCE_CHUNK) {
            vectors.extend(self.embed_chunk(chunk)?);
        }
        tracing::debug!(texts = texts.len(), "embedded batch");
        Ok(vectors)
    }
}
