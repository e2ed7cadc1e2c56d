pub mod auth_sessions;
pub mod lists;
pub mod password_reset;
pub mod searches;
pub mod settings;
pub mod users;
pub mod words;
