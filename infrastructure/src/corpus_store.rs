use domain::corpus::Corpus;
use domain::errors::RetrievalError;
use domain::models::ChunkMetadata;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use shared::types::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk layout: three parallel columns.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusBundle {
    pub embeddings: Vec<Vec<f32>>,
    pub chunks: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
}

pub struct CorpusStore {
    path: PathBuf,
}

impl CorpusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> std::result::Result<Corpus, RetrievalError> {
        let corpus_err =
            |e: &dyn std::fmt::Display| RetrievalError::Corpus(format!("{}: {e}", self.path.display()));

        let file = File::open(&self.path).map_err(|e| corpus_err(&e))?;
        let len = file.metadata().map_err(|e| corpus_err(&e))?.len();
        if len == 0 {
            return Err(corpus_err(&"file is empty"));
        }
        // The bundle is written once by the builder and only read here.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| corpus_err(&e))?;
        let bundle: CorpusBundle = serde_json::from_slice(&mmap).map_err(|e| corpus_err(&e))?;
        let corpus = Corpus::from_columns(bundle.embeddings, bundle.chunks, bundle.metadata)?;

        info!(
            path = %self.path.display(),
            chunks = corpus.len(),
            dimension = corpus.dimension(),
            "corpus loaded"
        );
        Ok(corpus)
    }

    /// Write the bundle next to its destination, then rename into place.
    pub fn save(&self, corpus: &Corpus) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let (embeddings, chunks, metadata) = corpus.to_columns();
        let bundle = CorpusBundle {
            embeddings,
            chunks,
            metadata,
        };

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer(&mut writer, &bundle)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        info!(path = %self.path.display(), chunks = corpus.len(), "corpus saved");
        Ok(())
    }
}
