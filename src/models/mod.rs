pub mod analysis_types;
pub mod auth_types;
pub mod history_types;
