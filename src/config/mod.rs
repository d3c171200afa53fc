pub mod kdl;
pub mod loader;
pub mod types;
