// Domain layer - Survey rows, sessions and the leveling computations
pub mod error;
pub mod leveling;
pub mod saved_benchmark;
pub mod survey_row;
pub mod survey_session;
