pub mod fetcher;
pub mod ssrf;
pub mod submission;
