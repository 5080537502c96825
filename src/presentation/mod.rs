// Presentation layer - HTTP handlers and routing state
pub mod api_error;
pub mod app_state;
pub mod handlers;
