#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! HTTP collaborators for language-model completion and embeddings, plus
//! the disabled stand-ins used when no API key is configured.

pub mod client;
pub mod disabled;
pub mod extract;

pub use client::OpenAiClient;
pub use disabled::DisabledLlm;
pub use extract::ActivityExtractor;
