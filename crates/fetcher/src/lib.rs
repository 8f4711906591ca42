//! Fetch remote satellite files into a local directory.
//!
//! Downloads are sequential and blocking. A file whose destination path
//! already exists is never fetched again; presence alone marks it as
//! downloaded (no checksum, no timestamp check).

pub mod config;
pub mod download;
pub mod error;

pub use config::FetchConfig;
pub use download::{
    build_url, download_many, download_one, ensure_dir, local_filename, DownloadFailure,
    DownloadReport, Fetcher,
};
pub use error::{FetchError, FetchResult};
