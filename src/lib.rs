//! # askdocs
//!
//! A document Q&A pipeline: ingest heterogeneous files into a local
//! vector store and answer natural-language questions grounded in them.
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────┐
//! │   Loader    │──▶│   Chunker    │──▶│  SQLite    │
//! │ pdf/docx/…  │   │ 500c / 250c  │   │ + vectors │
//! └─────────────┘   └──────────────┘   └─────┬─────┘
//!                                            │
//!                          question ─────────┤
//!                                            ▼
//!                                    ┌──────────────┐
//!                                    │  Answerer    │──▶ answer + sources
//!                                    │ top-k + LLM  │
//!                                    └──────────────┘
//! ```
//!
//! The two public operations are [`ingest::ingest`] and
//! [`answer::answer`]. Everything around them — transport, UI, session
//! state — is a caller concern; both operations are pure request/response
//! with the embedding store as the only shared state.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Core data types and result variants |
//! | [`error`] | Pipeline error taxonomy |
//! | [`loader`] | Multi-format file loading (txt, csv, json, pdf, docx, xlsx) |
//! | [`chunker`] | Overlapping character-window splitting |
//! | [`embedding`] | Embedding capability + vector utilities |
//! | [`llm`] | Language-model capability |
//! | [`store`] | Vector store abstraction (SQLite, in-memory) |
//! | [`ingest`] | Ingestion pipeline with whole-batch dedup |
//! | [`answer`] | Retrieval-augmented answering |

pub mod answer;
pub mod chunker;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod loader;
pub mod models;
pub mod store;
