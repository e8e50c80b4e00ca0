//! Agent adapters implementing the application [`Agent`](council_application::Agent) port.

mod command;

pub use command::{CommandAgent, DEFAULT_TIMEOUT};
