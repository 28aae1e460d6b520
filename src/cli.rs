//! `memweave model download`: fetch the embedding model into the cache dir.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::config::EmbeddingConfig;
use crate::embedding::local::model_files;

const HF_BASE: &str = "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// Download the ONNX model and tokenizer unless they are already present.
pub async fn model_download(config: &EmbeddingConfig) -> Result<()> {
    let (model_path, tokenizer_path) = model_files(config);
    let downloads = [
        (format!("{HF_BASE}/onnx/model.onnx"), model_path),
        (format!("{HF_BASE}/tokenizer.json"), tokenizer_path),
    ];

    for (url, dest) in &downloads {
        if dest.exists() {
            println!("{} already present", dest.display());
            continue;
        }
        if let Some(dir) = dest.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        println!("Downloading {url}");
        download_file(url, dest).await?;
        println!("Saved {}", dest.display());
    }

    println!("Model ready. Start the server with `memweave serve`.");
    Ok(())
}

fn progress_bar(total: Option<u64>) -> Result<ProgressBar> {
    let Some(total) = total else {
        return Ok(ProgressBar::new_spinner());
    };
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")?
            .progress_chars("##-"),
    );
    Ok(bar)
}

/// Stream `url` into `dest` through a `.part` file renamed on completion.
async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let mut response = reqwest::get(url)
        .await
        .with_context(|| format!("request to {url} failed"))?;
    anyhow::ensure!(
        response.status().is_success(),
        "download of {url} failed with HTTP {}",
        response.status()
    );

    let bar = progress_bar(response.content_length())?;
    let part = dest.with_extension("part");
    let mut file = tokio::fs::File::create(&part)
        .await
        .with_context(|| format!("failed to create {}", part.display()))?;

    while let Some(chunk) = response.chunk().await.context("error reading response")? {
        file.write_all(&chunk).await.context("error writing download")?;
        bar.inc(chunk.len() as u64);
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&part, dest)
        .await
        .with_context(|| format!("failed to move download to {}", dest.display()))?;
    bar.finish_and_clear();
    Ok(())
}
