pub mod ai_service;
pub mod dataset_service;
pub mod provider;
pub mod run_service;
pub mod session_service;
