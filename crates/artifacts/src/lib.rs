#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Artifact downloads for pkgrepo
//!
//! Places resolved artifacts in the local repository. Cached files are
//! checked against their recorded checksum sidecar; downloads are verified
//! against the checksum the remote publishes before they are moved into
//! place.

mod fetcher;
mod locks;

pub use fetcher::ArtifactFetcher;
pub use locks::PathLocks;
