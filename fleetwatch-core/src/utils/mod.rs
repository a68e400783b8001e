pub mod timestamps;

// Re-export commonly used items
pub use timestamps::*;
