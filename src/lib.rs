//! Travel Chat - client core for an AI travel assistant
//!
//! Keeps the conversation log and the opaque server context, runs one
//! request/response turn at a time against the assistant service, and
//! publishes snapshots for whatever renders the conversation.

pub mod config;
pub mod context;
pub mod runtime;
pub mod session;
pub mod state_machine;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use context::ConversationContext;
pub use runtime::{spawn_conversation, ConversationHandle, SessionEvent, SystemClock};
pub use session::{ConversationSession, Message, Sender, SessionSnapshot, DEFAULT_GREETING};
pub use transport::{AssistantTransport, HttpTransport, LoggingTransport, TransportError};
