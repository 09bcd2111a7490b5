use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tera::Context;
use tracing::{info, warn};

use crate::config::SiteMeta;
use crate::post::Post;
use crate::template::{TemplateError, TemplateRenderer};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const POST_TEMPLATE: &str = "post.html";
pub const INDEX_ROUTE: &str = "/";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Failed to render {route}")]
    Page {
        route: String,
        #[source]
        source: TemplateError,
    },
}

/// Site-relative route of a post page.
pub fn post_route(slug: &str) -> String {
    format!("/posts/{slug}.html")
}

pub fn post_output_path(output_dir: &Path, slug: &str) -> PathBuf {
    output_dir.join("posts").join(format!("{slug}.html"))
}

/// Renders the index and post pages into an output directory and reports the
/// route of every page it wrote.
pub struct SiteRenderer<'a> {
    templates: &'a TemplateRenderer,
    site: &'a SiteMeta,
    output_dir: PathBuf,
}

impl<'a> SiteRenderer<'a> {
    pub fn new<P: AsRef<Path>>(
        templates: &'a TemplateRenderer,
        site: &'a SiteMeta,
        output_dir: P,
    ) -> Result<Self, RenderError> {
        templates.require(&[INDEX_TEMPLATE, POST_TEMPLATE])?;

        Ok(Self {
            templates,
            site,
            output_dir: output_dir.as_ref().to_path_buf(),
        })
    }

    /// Index first, then posts in order.
    pub fn render_all(&self, posts: &[Post]) -> Result<Vec<String>, RenderError> {
        let mut routes = vec![self.render_index(posts)?];
        routes.extend(self.render_posts(posts)?);

        info!(pages = routes.len(), "Rendered pages");
        Ok(routes)
    }

    pub fn render_index(&self, posts: &[Post]) -> Result<String, RenderError> {
        let mut context = self.site_context();
        context.insert("posts", posts);

        self.write_page(
            INDEX_TEMPLATE,
            &context,
            &self.output_dir.join("index.html"),
            INDEX_ROUTE,
        )?;

        Ok(INDEX_ROUTE.to_string())
    }

    /// Later posts overwrite earlier ones that share a slug.
    pub fn render_posts(&self, posts: &[Post]) -> Result<Vec<String>, RenderError> {
        let mut routes = Vec::with_capacity(posts.len());
        let mut seen = HashSet::new();

        for post in posts {
            if !seen.insert(post.slug.as_str()) {
                warn!(
                    slug = %post.slug,
                    source = %post.source.display(),
                    "Duplicate slug, overwriting an earlier post"
                );
            }

            let mut context = self.site_context();
            context.insert("post", post);

            let route = post_route(&post.slug);
            self.write_page(
                POST_TEMPLATE,
                &context,
                &post_output_path(&self.output_dir, &post.slug),
                &route,
            )?;
            routes.push(route);
        }

        Ok(routes)
    }

    fn site_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site_title", &self.site.site_title);
        context.insert("site_description", &self.site.site_description);
        context
    }

    fn write_page(
        &self,
        template: &str,
        context: &Context,
        path: &Path,
        route: &str,
    ) -> Result<(), RenderError> {
        self.templates
            .render_to_file(template, context, path)
            .map_err(|source| RenderError::Page {
                route: route.to_string(),
                source,
            })
    }
}
