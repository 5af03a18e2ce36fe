pub mod html;
pub mod web;

pub use web::{HttpFetcher, SearxngClient};
