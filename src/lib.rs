pub mod balance;
pub mod dlq;
pub mod domain;
pub mod engine;
pub mod ingestion;
pub mod report;
pub mod repository;
pub mod service;
pub mod settings;
pub mod settlement;
pub mod split;
