// Handler modules
pub mod analyze;
pub mod generate;
pub mod pipeline;
pub mod utils;

// Re-export all handler functions
pub use analyze::{handle_cost, handle_security, handle_validate};
pub use generate::{GenerateOptions, handle_generate};
pub use pipeline::handle_pipeline;
pub use utils::handle_catalog;
