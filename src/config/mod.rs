//! Config module — saved vault connections.

pub mod instance;
pub mod settings;

pub use instance::VaultInstance;
pub use settings::Settings;
