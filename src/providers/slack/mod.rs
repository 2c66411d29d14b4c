mod client;
mod types;

pub use client::SlackClient;
pub use types::Block;
