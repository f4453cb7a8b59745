//! Core pipeline for the frontdesk relay.
//!
//! Ties together the FAQ index, the session registry, and the escalation
//! heuristics behind the [`Resolver`], which turns one user message into a
//! reply plus escalation signals. The [`spawn_sweeper`] task keeps the
//! registry free of idle sessions.

pub mod error;
pub mod escalation;
pub mod faq;
pub mod registry;
pub mod resolver;
pub mod sweeper;
pub mod types;

pub use error::{FaqError, RegistryError};
pub use escalation::EscalationDetector;
pub use faq::{FaqEntry, FaqIndex, FaqMatch};
pub use registry::{EscalateOutcome, SessionRegistry};
pub use resolver::{FALLBACK_RESPONSE, HANDOFF_RESPONSE, Resolver, summarize_conversation};
pub use sweeper::{SweeperHandle, spawn_sweeper};
pub use types::{
    ActiveSession, Confidence, EscalationTrigger, Resolution, Role, Session, SessionId, Source,
};
