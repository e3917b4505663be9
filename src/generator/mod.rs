//! Manifest and pipeline generation.

pub mod catalog;
pub mod manifests;
pub mod naming;
pub mod pipeline;
pub mod renderer;
pub mod spec;
pub mod types;

pub use catalog::{ComponentCatalog, ComponentType, Dependency, ResourceProfile};
pub use pipeline::{CiPlatform, ProjectType, generate_pipeline};
pub use renderer::{ManifestRenderer, RenderSettings};
pub use spec::ComponentSpec;
pub use types::{DocumentKind, RenderedDocument, RenderedSet};
