//! Background tasks.

pub mod news_check_task;
