//! Discovery Intake — AI-assisted client intake forms.

pub mod config;
pub mod error;
pub mod form;
pub mod generation;
pub mod model;
pub mod routes;
pub mod submission;
pub mod webhook;
