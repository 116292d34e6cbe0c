pub mod app;
pub mod logging;
pub mod output;
pub mod prompts;
pub mod report;
pub mod utils;
pub mod validation;
