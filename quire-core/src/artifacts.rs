//! Sitemap, robots and cache-policy files.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!   </url>
//! </urlset>
//! ```

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::output::write_file;

/// Stand-in used when the config has no `base_url`.
pub const PLACEHOLDER_BASE_URL: &str = "https://example.com";

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";
pub const HEADERS_FILE: &str = "_headers";

/// Pages are always revalidated; fingerprinted assets are cached for a year.
pub const HEADERS: &str = "/*
  Cache-Control: no-cache

/assets/*
  Cache-Control: public, max-age=31536000, immutable
";

#[derive(Debug, thiserror::Error)]
#[error("Failed to write {}", path.display())]
pub struct ArtifactError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// The configured base URL, or the placeholder when none is set.
pub fn effective_base_url(configured: Option<&str>) -> &str {
    match configured {
        Some(url) if !url.trim().is_empty() => url,
        _ => {
            warn!(
                placeholder = PLACEHOLDER_BASE_URL,
                "No base_url configured, sitemap and robots.txt will use a placeholder domain"
            );
            PLACEHOLDER_BASE_URL
        }
    }
}

/// Join a site-relative route onto the base URL with exactly one slash.
pub fn absolute_url(base_url: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

pub fn sitemap_xml<S: AsRef<str>>(base_url: &str, routes: &[S]) -> String {
    let mut xml = String::with_capacity(128 + routes.len() * 64);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
    xml.push('\n');

    for route in routes {
        let loc = absolute_url(base_url, route.as_ref());
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", html_escape::encode_text(&loc)));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

pub fn robots_txt(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nSitemap: {}\n",
        absolute_url(base_url, SITEMAP_FILE)
    )
}

/// Write `sitemap.xml`, `robots.txt` and `_headers` into `output_dir`.
pub fn write_artifacts<S: AsRef<str>>(
    output_dir: &Path,
    base_url: &str,
    routes: &[S],
) -> Result<(), ArtifactError> {
    let files = [
        (SITEMAP_FILE, sitemap_xml(base_url, routes)),
        (ROBOTS_FILE, robots_txt(base_url)),
        (HEADERS_FILE, HEADERS.to_string()),
    ];

    for (name, contents) in &files {
        let path = output_dir.join(name);
        write_file(&path, contents).map_err(|source| ArtifactError { path, source })?;
    }

    info!(urls = routes.len(), base_url, "Wrote sitemap, robots.txt and _headers");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absolute_url_single_slash() {
        assert_eq!(absolute_url("https://x.com", "/"), "https://x.com/");
        assert_eq!(absolute_url("https://x.com/", "/posts/a.html"), "https://x.com/posts/a.html");
        assert_eq!(absolute_url("https://x.com//", "posts/a.html"), "https://x.com/posts/a.html");
        assert_eq!(absolute_url("https://x.com/blog", "/"), "https://x.com/blog/");
    }

    #[test]
    fn test_effective_base_url() {
        assert_eq!(effective_base_url(Some("https://x.com")), "https://x.com");
        assert_eq!(effective_base_url(Some("  ")), PLACEHOLDER_BASE_URL);
        assert_eq!(effective_base_url(None), PLACEHOLDER_BASE_URL);
    }

    #[test]
    fn test_sitemap() {
        let xml = sitemap_xml("https://x.com", &["/", "/posts/a.html"]);
        assert_eq!(
            xml,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://x.com/</loc>
  </url>
  <url>
    <loc>https://x.com/posts/a.html</loc>
  </url>
</urlset>
"#
        );
        assert_eq!(xml.matches("<loc>").count(), 2);
        assert!(!xml.contains("lastmod"));
        assert!(!xml.contains("priority"));
    }

    #[test]
    fn test_sitemap_keeps_route_order() {
        let xml = sitemap_xml("https://x.com", &["/", "/posts/z.html", "/posts/a.html"]);
        let z = xml.find("z.html").unwrap();
        let a = xml.find("a.html").unwrap();
        assert!(z < a);
    }

    #[test]
    fn test_sitemap_empty_routes() {
        let xml = sitemap_xml::<&str>("https://x.com", &[]);
        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_sitemap_escapes_locations() {
        let xml = sitemap_xml("https://x.com", &["/posts/fish&chips.html"]);
        assert!(xml.contains("<loc>https://x.com/posts/fish&amp;chips.html</loc>"));
    }

    #[test]
    fn test_robots() {
        assert_eq!(
            robots_txt("https://x.com/"),
            "User-agent: *\nAllow: /\nSitemap: https://x.com/sitemap.xml\n"
        );
    }

    #[test]
    fn test_write_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), PLACEHOLDER_BASE_URL, &["/"]).unwrap();

        let sitemap = std::fs::read_to_string(dir.path().join(SITEMAP_FILE)).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/</loc>"));
        let robots = std::fs::read_to_string(dir.path().join(ROBOTS_FILE)).unwrap();
        assert!(robots.ends_with("Sitemap: https://example.com/sitemap.xml\n"));
        let headers = std::fs::read_to_string(dir.path().join(HEADERS_FILE)).unwrap();
        assert_eq!(
            headers,
            "/*\n  Cache-Control: no-cache\n\n/assets/*\n  Cache-Control: public, max-age=31536000, immutable\n"
        );
    }
}
