pub mod db;
pub mod lexicon;
pub mod ollama;
pub mod reddit;

pub use db::DbAdapter;
pub use lexicon::LexiconPolarityAdapter;
pub use ollama::OllamaAdapter;
pub use reddit::RedditFeedAdapter;
