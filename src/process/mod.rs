//! Target process attachment and session ownership

mod session;

pub use session::Session;
