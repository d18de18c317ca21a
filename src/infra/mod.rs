pub mod file_system;
pub mod git;
pub mod logger;
pub mod output;
pub mod progress;
