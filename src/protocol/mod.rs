pub mod events;
pub mod types;

pub use events::{AgentResponse, AgentStatus, BasicChatEvent, ReflectionChatEvent};
pub use types::{Reflection, ReflectionMessage};
