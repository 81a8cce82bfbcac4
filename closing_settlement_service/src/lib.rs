pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod handlers;
pub mod orchestrator;
pub mod routes;
pub mod scheduler;

#[cfg(test)]
mod testing;
