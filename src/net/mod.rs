//! Request/response model and the network fetch seam.

mod client;
mod types;

pub use client::{FetchOptions, Fetcher, HttpFetcher};
pub use types::{Headers, Method, Request, RequestMode, Response, ResponseKind};
