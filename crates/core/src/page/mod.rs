pub mod traits;

// Page implementations
pub mod memory;
