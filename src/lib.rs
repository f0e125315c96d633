pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod output;
pub mod utils;

#[cfg(test)]
mod tests;
