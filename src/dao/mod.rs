/// Database model definitions.
pub mod models;
/// Persistence backends for quiz rooms and answers.
pub mod quiz_store;
/// Storage abstraction layer for database operations.
pub mod storage;
