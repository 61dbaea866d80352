//! hlsdm core: HLS manifest parsing, segment download engine, and output assembly.
//!
//! The [`engine`] runs one job at a time under a bounded worker pool,
//! pushing each segment through decryption and optional transcoding into
//! an ordered output sink. Network, cipher and transcoder capabilities are
//! traits so embedders can swap them.

pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod job;
pub mod logging;
pub mod manifest;
pub mod retry;
pub mod scheduler;
pub mod segmenter;
pub mod storage;
pub mod transcode;
pub mod url_model;

pub use engine::{EngineBuilder, EngineEvent, EngineHandle, EngineSettings, JobRequest, Opened, Probe};
pub use error::{FetchError, HlsError};
