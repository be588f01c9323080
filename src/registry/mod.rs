//! Package registry access and deprecation lookups

pub mod client;
pub mod nuget;

pub use client::RegistryClient;
pub use nuget::{contains_version, NuGetRegistry};
