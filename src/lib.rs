//! lead-notify: contact-form lead notifications over email or SMS.

pub mod channels;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod lead;
pub mod server;
