pub mod inproc;
pub mod request_channel;
