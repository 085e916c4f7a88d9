// Library interface for newsdigest modules
// This allows tests and the binary to import modules

pub mod controller;
pub mod languages;
pub mod llm;
pub mod markdown;
pub mod news;
pub mod pdf;
pub mod sessions;
