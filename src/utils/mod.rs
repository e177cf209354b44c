//! Shared utilities: host address validation.

pub mod ip_utils;

pub use ip_utils::{is_valid_hostname, is_valid_ip};
