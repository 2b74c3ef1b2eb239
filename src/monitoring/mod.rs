#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Observability: Prometheus metrics, HTTP exposition and log setup.

pub mod http;
pub mod logging;
pub mod metrics;
