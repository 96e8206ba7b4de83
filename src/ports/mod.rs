pub mod approval_service;
pub mod request_repository;
