//! CLI command implementations.

pub mod agent;
pub mod init;
pub mod keygen;
pub mod pay;
pub mod stats;
pub mod task;

// Re-export command handlers
pub use agent::agent;
pub use init::init;
pub use keygen::keygen;
pub use pay::pay;
pub use stats::stats;
pub use task::task;
