pub mod helptags;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod scheduler;
pub mod types;
