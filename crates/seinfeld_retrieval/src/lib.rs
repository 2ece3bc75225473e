//! Reference-dialogue retrieval for the Seinfeld script generator.
//!
//! [`RetrievalTool`] is the only entry point the pipeline uses. It wraps an
//! [`Embeddings`](seinfeld_interface::Embeddings) provider and a
//! [`VectorIndex`](seinfeld_interface::VectorIndex) and never fails: when
//! the backend is missing, unreachable, or returns nothing, it answers with
//! a fixed set of illustrative passages instead.
//!
//! Two indexes ship with the crate:
//! - [`CouchbaseQueryIndex`] runs vector SQL++ against a Couchbase query service
//! - [`InMemoryIndex`] ranks a local corpus by cosine similarity

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod couchbase;
mod demo;
mod hash_embeddings;
mod memory;
mod similarity;
mod tool;

pub use couchbase::{CouchbaseQueryIndex, query_service_url};
pub use demo::{demo_passages, demo_topic};
pub use hash_embeddings::HashEmbeddings;
pub use memory::{InMemoryIndex, IndexedDialogue};
pub use similarity::{cosine_similarity, rank_matches};
pub use tool::RetrievalTool;
