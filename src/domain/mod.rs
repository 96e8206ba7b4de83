pub mod request;
pub mod sheets;

// Re-export commonly used types
pub use request::*;
