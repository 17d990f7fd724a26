use domain::corpus::Corpus;
use domain::errors::RetrievalError;
use domain::models::RetrievalResult;
use rayon::prelude::*;

pub struct SearchEngine;

impl SearchEngine {
    /// Dot product over the product of norms. A zero vector scores 0.0 instead of NaN.
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }

    /// Dense scan of the whole corpus, highest similarity first.
    ///
    /// Ties keep corpus order. `k` larger than the corpus returns every chunk;
    /// an empty corpus yields an empty result rather than an error.
    pub fn top_k(
        query_embedding: &[f32],
        corpus: &Corpus,
        k: usize,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        if corpus.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query_embedding.len() != corpus.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: corpus.dimension(),
                actual: query_embedding.len(),
            });
        }

        let mut similarities: Vec<(usize, f32)> = corpus
            .chunks()
            .par_iter()
            .enumerate()
            .map(|(idx, chunk)| (idx, Self::cosine_similarity(query_embedding, &chunk.embedding)))
            .collect();

        // sort_by is stable, so equal scores stay in index order.
        similarities.sort_by(|a, b| b.1.total_cmp(&a.1));
        similarities.truncate(k);

        Ok(similarities
            .into_iter()
            .map(|(idx, score)| {
                let chunk = &corpus.chunks()[idx];
                RetrievalResult {
                    index: idx,
                    text: chunk.text.clone(),
                    source_url: chunk.source_url.clone(),
                    score,
                }
            })
            .collect())
    }

    /// Index of the best-scoring candidate; the first one wins ties.
    pub fn best_match(query_embedding: &[f32], candidates: &[Vec<f32>]) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            let score = Self::cosine_similarity(query_embedding, candidate);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((idx, score)),
            }
        }
        best
    }
}
