pub mod chunker;
pub mod context_generator;
pub mod file_selector;
pub mod language;
pub mod optimizer;
pub mod patterns;
pub mod pipeline;
