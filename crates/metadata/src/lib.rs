#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Metadata documents for pkgrepo
//!
//! Reads POM documents through the session memo, the local repository and
//! the configured remotes, then produces the effective model: parents
//! merged, properties interpolated, dependency management applied.

mod effective;
mod fetcher;
mod interpolate;
mod pom;

pub use effective::{EffectivePom, ManagedDependency};
pub use fetcher::{MetadataFetcher, MAX_PARENT_DEPTH};
