// Chat gateway - answers chat messages through a local model
// Library exports

pub mod config;
pub mod inference;
pub mod server;
pub mod store;
