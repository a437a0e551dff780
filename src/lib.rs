// Re-export needed modules for the binary and integration tests
pub mod chat;
pub mod conversation;
pub mod delivery;
pub mod models;
pub mod profile;
pub mod roster;
pub mod settings;
pub mod storage;

// Re-export main types for convenience
pub use chat::ChatSession;
pub use delivery::{DeliveryTracker, SimulatedReceipts, StatusUpdate};
pub use models::*;
pub use profile::{ProfileStore, SharedProfile};
pub use settings::{Setting, SettingKey, Settings};
