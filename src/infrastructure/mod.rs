// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_export;
pub mod file_repository;
pub mod http_response;
#[cfg(test)]
pub mod memory_repository;
