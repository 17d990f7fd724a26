use application::rag_service::RagService;
use domain::corpus::Corpus;
use domain::errors::RetrievalError;
use domain::models::{Chunk, RetrievalResult};
use infrastructure::search::SearchEngine;
use std::sync::Arc;
use tests::{keyword_vector, sample_corpus, FailingEmbedder, KeywordEmbedder};

fn vector_corpus(vectors: &[[f32; 3]]) -> Corpus {
    let chunks = vectors
        .iter()
        .zip(["A", "B", "C", "D", "E"])
        .map(|(v, name)| Chunk {
            text: format!("chunk {name}"),
            source_url: format!("https://example.org/{name}"),
            source: None,
            embedding: v.to_vec(),
        })
        .collect();
    Corpus::from_chunks(chunks).unwrap()
}

#[test]
fn closest_chunk_is_returned_first() {
    let corpus = vector_corpus(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    let results = SearchEngine::top_k(&[0.1, 0.9, 0.2], &corpus, 1).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "chunk B");
    assert_eq!(results[0].source_url, "https://example.org/B");
}

#[test]
fn every_k_up_to_n_returns_k_sorted_results() {
    let corpus = vector_corpus(&[
        [1.0, 0.2, 0.0],
        [0.0, 1.0, 0.0],
        [0.3, 0.3, 0.3],
        [-1.0, 0.0, 0.5],
        [0.9, 0.1, 0.1],
    ]);
    let query = [0.8, 0.4, 0.1];
    for k in 1..=corpus.len() {
        let results = SearchEngine::top_k(&query, &corpus, k).unwrap();
        assert_eq!(results.len(), k);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(results.iter().all(|r| (-1.0..=1.0).contains(&r.score)));
    }
}

#[test]
fn oversized_k_returns_the_whole_corpus_in_order() {
    let corpus = vector_corpus(&[[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.5, 0.5, 0.0]]);
    let results: Vec<RetrievalResult> = SearchEngine::top_k(&[1.0, 0.0, 0.0], &corpus, 99).unwrap();
    let order: Vec<usize> = results.iter().map(|r| r.index).collect();
    assert_eq!(order, vec![1, 2, 0]);
}

#[test]
fn empty_corpus_returns_nothing_for_any_k() {
    for k in [0, 1, 5, 1000] {
        assert!(SearchEngine::top_k(&[1.0], &Corpus::empty(), k).unwrap().is_empty());
    }
}

#[tokio::test]
async fn search_ranks_the_matching_chunk_first() {
    let rag = RagService::new(sample_corpus(), Arc::new(KeywordEmbedder::default()));
    let results = rag.search("when is the deadline?", 2).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].source_url.ends_with("/t/ga3/101"));
}

#[tokio::test]
async fn query_from_a_different_model_is_rejected() {
    let corpus = vector_corpus(&[[1.0, 0.0, 0.0]]);
    let rag = RagService::new(corpus, Arc::new(KeywordEmbedder::default()));
    let err = rag.embed_query("python").await.unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::DimensionMismatch {
            expected: 3,
            actual: 7
        }
    ));
}

#[tokio::test]
async fn embedding_failure_propagates() {
    let rag = RagService::new(sample_corpus(), Arc::new(FailingEmbedder));
    let err = rag.search("python", 3).await.unwrap_err();
    assert!(matches!(err, RetrievalError::Embedding(_)));
}

#[tokio::test]
async fn best_sentence_picks_the_most_similar_one() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let rag = RagService::new(sample_corpus(), embedder.clone());
    let text = "Welcome to week two. Docker containers isolate apps. Git tracks history.";
    let sentence = rag.best_sentence(text, &keyword_vector("git")).await.unwrap();
    assert_eq!(sentence, "Git tracks history.");
    assert_eq!(embedder.calls(), 3);
}

#[tokio::test]
async fn best_sentence_ties_keep_the_first_sentence() {
    let rag = RagService::new(sample_corpus(), Arc::new(KeywordEmbedder::default()));
    let text = "Python is used. Python is loved.";
    let sentence = rag.best_sentence(text, &keyword_vector("python")).await.unwrap();
    assert_eq!(sentence, "Python is used.");
}

#[tokio::test]
async fn single_sentence_is_returned_verbatim() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let rag = RagService::new(sample_corpus(), embedder.clone());
    let sentence = rag
        .best_sentence("   Submit GA1 on the portal   ", &keyword_vector("git"))
        .await
        .unwrap();
    assert_eq!(sentence, "Submit GA1 on the portal");
}

#[tokio::test]
async fn empty_text_falls_back_without_embedding() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let rag = RagService::new(sample_corpus(), embedder.clone());
    let sentence = rag.best_sentence("", &keyword_vector("git")).await.unwrap();
    assert_eq!(sentence, "...");
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn citation_strips_html_and_truncates() {
    let rag = RagService::new(sample_corpus(), Arc::new(KeywordEmbedder::default()));
    let long_sentence = format!("<p>{} python</p>", "word ".repeat(80));
    let result = RetrievalResult {
        index: 0,
        text: long_sentence,
        source_url: "https://tds/long".to_string(),
        score: 0.5,
    };
    let link = rag.citation_for(&result, &keyword_vector("python")).await.unwrap();
    assert_eq!(link.url, "https://tds/long");
    assert_eq!(link.text.chars().count(), 253);
    assert!(link.text.starts_with("word word"));
    assert!(link.text.ends_with("..."));
    assert!(!link.text.contains('<'));
}
