// Session memory module
// Time-bounded, in-process conversation history keyed by session id

pub mod store;

pub use store::{Role, SessionConfig, SessionStore, Turn};
