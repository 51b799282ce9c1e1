//! Copilot relay subsystem.
//!
//! # Data Flow
//! ```text
//! POST / (JSON body, X-GitHub-Token header)
//!     → payload.rs (decode Conversation)
//!     → credential.rs (extract bearer token)
//!     → orchestrator.rs (append persona, build upstream request)
//!     → upstream.rs (POST to completions endpoint)
//!     → raw upstream body back to the caller
//! ```
//!
//! # Security Constraints
//! - The credential is never persisted
//! - The credential is never logged in clear
//! - Upstream error bodies are logged, not echoed to the caller

pub mod credential;
pub mod error;
pub mod orchestrator;
pub mod payload;
pub mod upstream;

pub use credential::{Credential, X_GITHUB_TOKEN};
pub use error::{RelayError, RelayResult};
pub use orchestrator::RelayOrchestrator;
pub use payload::{decode, Conversation, DecodeError, Message};
pub use upstream::{UpstreamClient, UpstreamError, UpstreamRequest};
