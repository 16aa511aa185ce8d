pub mod client;
pub mod observer;
