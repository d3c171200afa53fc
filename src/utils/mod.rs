pub mod cmd;
pub mod paths;
