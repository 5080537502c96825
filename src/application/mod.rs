// Application layer - Use cases over the survey session and saved benchmarks
pub mod benchmark_service;
pub mod survey_repository;
pub mod survey_service;
