pub mod answer_service;
pub mod index_service;
pub mod rag_service;
