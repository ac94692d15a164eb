//! plantcare-service: stateless HTTP relay between the mobile client and
//! the Gemini generative language API.
pub mod config;
pub mod handlers;
pub mod models;
pub mod prompt;
pub mod services;
pub mod startup;
