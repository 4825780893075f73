pub mod client;
pub mod peer;
