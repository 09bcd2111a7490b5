//! Content pipeline for quire: Markdown posts with YAML front matter in,
//! a static blog out.
//!
//! [`build_site`] runs the whole thing. The pieces are usable on their own:
//! [`PostLoader`] turns a source tree into ordered [`Post`]s,
//! [`SiteRenderer`] writes the index and post pages and reports their routes,
//! and [`artifacts`] produces the sitemap, robots and headers files.

pub mod artifacts;
pub mod build;
pub mod config;
pub mod excerpt;
pub mod front_matter;
pub mod loader;
pub mod markdown;
pub mod output;
pub mod post;
pub mod renderer;
pub mod template;

// Re-export main types
pub use build::{BuildError, BuildReport, build_site};
pub use config::{BuildPaths, SiteConfig, SiteMeta};
pub use loader::{PostLoader, load_posts};
pub use markdown::MarkdownRenderer;
pub use post::Post;
pub use renderer::SiteRenderer;
pub use template::{TemplateError, TemplateRenderer};
