pub mod dto;
pub mod service;
pub mod signature;

pub use dto::{InboundEvent, InboundMessage, MessageType, WebhookPayload};
pub use service::{WebhookOutcome, WebhookService};
pub use signature::{SignatureVerifier, SIGNATURE_HEADER};
