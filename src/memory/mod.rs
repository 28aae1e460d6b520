pub mod dedup;
pub mod graph;
pub mod lexical;
pub mod search;
pub mod stats;
pub mod store;
pub mod types;
