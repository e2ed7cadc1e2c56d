pub mod email_provider;
pub mod progress;
pub mod quiz;
pub mod recognition;
pub mod search;
pub mod session_store;
pub mod study_session;
