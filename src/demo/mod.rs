//! Manual test chat endpoint support.

pub mod chat;

pub use chat::DemoChat;
