pub mod auth_guard;
pub mod auth_model;
pub mod drink_model;
pub mod drink_store;
