pub mod sanitization;
pub mod subscriber;
pub mod tracing;

pub use sanitization::*;
pub use subscriber::*;
pub use tracing::*;
