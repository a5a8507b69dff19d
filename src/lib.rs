#![doc = "bucket-publish: upload local files to an object-storage bucket."]

//! Stages files, optionally clears the destination prefix, uploads every
//! valid file with per-pattern transport properties and finally invalidates
//! the CDN distribution in front of the bucket.
//!
//! # Usage
//! Build a [`publish::Publisher`] from a [`publish::PublishConfig`] and the
//! collaborators in [`contract`], register files, then call `publish()`.

pub mod aws;
pub mod cli;
pub mod contract;
pub mod fs;
pub mod key;
pub mod load_config;
pub mod pattern;
pub mod properties;
pub mod publish;
pub mod registry;
pub mod validate;

pub use cli::{run, Cli, Commands};
