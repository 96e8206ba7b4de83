pub mod config;
#[cfg(test)]
pub mod memory_repository;
pub mod sheets;
pub mod web;
