pub mod reply;
pub mod speech;
pub mod webhook;
