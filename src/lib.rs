//! bond-news-watch - Watches the NSD disclosure site for bond news.
//!
//! This crate provides:
//! - Periodic ingestion of news items into a deduplicating ledger
//! - Per-subscriber ISIN subscriptions
//! - Routing of new events to subscribers through a rate-limited delivery queue

pub mod config;
pub mod delivery;
pub mod entity;
pub mod error;
pub mod feed;
pub mod isin;
pub mod logging;
pub mod repository;
pub mod service;
pub mod task;
