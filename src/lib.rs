pub mod collection;
pub mod config;
pub mod environment;
pub mod errors;
pub mod image;
pub mod journal;
pub mod migration;
pub mod normalization;
pub mod persistence;
pub mod render;
pub mod review;
pub mod stars;
pub mod store;
