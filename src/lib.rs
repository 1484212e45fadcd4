//! Library crate for ritual-quiz-back, exposing modules for binaries and integration tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod services;
pub mod state;
