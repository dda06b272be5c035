//! In-memory collaborator implementations.

pub mod amm;
pub mod authority;
pub mod events;
pub mod internal;
pub mod scripted;

pub use amm::ConstantProductRouter;
pub use authority::SingleOwner;
pub use events::EventLog;
pub use internal::InMemoryChain;
pub use scripted::{RouterBehaviour, ScriptedRouter, SwapHook};
