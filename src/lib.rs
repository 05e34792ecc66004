// Public modules that need to be accessible from tests
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod seeding;
pub mod state;
pub mod validation;
