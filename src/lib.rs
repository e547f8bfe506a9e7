pub mod api;
pub mod config;
pub mod data;
pub mod pages;
pub mod query;
pub mod region;
