//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — domain-level errors
//! - [`string`] — text helpers used for titles and log previews

pub mod error;
pub mod string;
