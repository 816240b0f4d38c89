//! Consumer-side helper for querying a Data Services Directory service.
//!
//! Abstracts the REST call to the DSD search endpoint: builds the query
//! URL for either supported query kind, performs the GET and hands back
//! the raw RegRep document or the extracted dataset records.

pub mod client;

pub use client::DsdClient;
