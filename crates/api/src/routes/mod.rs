//! HTTP routes

pub mod harvest;
