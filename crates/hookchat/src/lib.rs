pub mod blob_store;
pub mod composer;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod models;
pub mod recorder;
pub mod renderer;
pub mod transport;
