use crate::embedder::EmbeddingInput;
use domain::models::{ChunkMetadata, ChunkSource, SourceDocument};
use rayon::prelude::*;
use serde::Deserialize;
use shared::types::Result;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const DEFAULT_CHUNK_WORDS: usize = 500;
pub const DEFAULT_OVERLAP_WORDS: usize = 100;

#[derive(Deserialize)]
struct CourseRecord {
    content: String,
    #[serde(alias = "url")]
    github_url: String,
}

#[derive(Deserialize)]
struct DiscourseRecord {
    content: String,
    #[serde(alias = "post_url")]
    url: String,
}

/// Read the scraped course pages (`[{content, github_url}]`).
pub fn load_course_documents(path: &Path) -> Result<Vec<SourceDocument>> {
    let records: Vec<CourseRecord> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    Ok(records
        .into_iter()
        .map(|r| SourceDocument {
            text: r.content,
            url: r.github_url,
            source: ChunkSource::Course,
        })
        .collect())
}

/// Read the scraped forum posts (`[{content, url}]`).
pub fn load_discourse_documents(path: &Path) -> Result<Vec<SourceDocument>> {
    let records: Vec<DiscourseRecord> =
        serde_json::from_reader(BufReader::new(File::open(path)?))?;
    Ok(records
        .into_iter()
        .map(|r| SourceDocument {
            text: r.content,
            url: r.url,
            source: ChunkSource::Discourse,
        })
        .collect())
}

/// Fixed-size overlapping word windows.
#[derive(Debug, Clone, Copy)]
pub struct WordChunker {
    chunk_words: usize,
    overlap_words: usize,
}

impl WordChunker {
    pub fn new(chunk_words: usize, overlap_words: usize) -> Result<Self> {
        anyhow::ensure!(chunk_words > 0, "chunk size must be positive");
        anyhow::ensure!(
            overlap_words < chunk_words,
            "overlap ({overlap_words}) must be smaller than chunk size ({chunk_words})"
        );
        Ok(Self {
            chunk_words,
            overlap_words,
        })
    }

    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let stride = self.chunk_words - self.overlap_words;
        let mut chunks = Vec::with_capacity(words.len() / stride + 1);
        let mut start = 0;

        while start < words.len() {
            let end = (start + self.chunk_words).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end == words.len() {
                break;
            }
            start += stride;
        }
        chunks
    }

    /// Chunk all documents in parallel, dropping repeated chunk texts within a document.
    pub fn chunk_documents(&self, documents: &[SourceDocument]) -> Vec<EmbeddingInput> {
        documents
            .par_iter()
            .map(|doc| {
                let mut seen_hashes = HashSet::new();
                self.chunk_text(&doc.text)
                    .into_iter()
                    .filter(|chunk| seen_hashes.insert(md5::compute(chunk.as_bytes()).0))
                    .map(|text| EmbeddingInput {
                        text,
                        metadata: ChunkMetadata {
                            url: doc.url.clone(),
                            source: Some(doc.source),
                        },
                    })
                    .collect::<Vec<_>>()
            })
            .flatten()
            .collect()
    }
}

impl Default for WordChunker {
    fn default() -> Self {
        Self {
            chunk_words: DEFAULT_CHUNK_WORDS,
            overlap_words: DEFAULT_OVERLAP_WORDS,
        }
    }
}
