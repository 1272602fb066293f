pub mod activity;
pub mod cli;
pub mod config;
pub mod panel;
pub mod protocol;
pub mod store;
pub mod web;
