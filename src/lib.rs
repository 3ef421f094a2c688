pub mod api_connection;
pub mod cli;
pub mod config;
pub mod estimator;
pub mod meal_plan;
pub mod report;
pub mod settings;
