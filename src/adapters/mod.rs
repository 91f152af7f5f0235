// Adapters layer: concrete implementations for external systems (course catalogs, text generation, http).

pub mod http;
pub mod llm;
pub mod providers;
