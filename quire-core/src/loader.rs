use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::excerpt::{EXCERPT_LENGTH, build_excerpt};
use crate::front_matter::{self, FrontMatterError};
use crate::markdown::MarkdownRenderer;
use crate::post::{Post, parse_date};

/// Posts live in this subdirectory of the source root.
pub const POSTS_DIR: &str = "posts";
pub const DOCUMENT_EXTENSION: &str = "md";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to scan {}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Invalid front matter in {}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    #[error("Missing 'date' in front matter: {}", .0.display())]
    MissingDate(PathBuf),
    #[error("Invalid '{field}' date {value:?} in {} (expected YYYY-MM-DD)", path.display())]
    InvalidDate {
        field: &'static str,
        value: String,
        path: PathBuf,
        #[source]
        source: chrono::ParseError,
    },
}

/// Turns a source tree into an ordered list of posts.
pub struct PostLoader {
    source_dir: PathBuf,
    markdown: MarkdownRenderer,
}

impl PostLoader {
    pub fn new<P: AsRef<Path>>(source_dir: P) -> Self {
        Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            markdown: MarkdownRenderer::new(),
        }
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.source_dir.join(POSTS_DIR)
    }

    /// Load every non-draft post, newest first.
    ///
    /// A missing posts directory is an empty blog, not an error.
    pub fn load(&mut self) -> Result<Vec<Post>, LoadError> {
        let posts_dir = self.posts_dir();
        if !posts_dir.is_dir() {
            debug!(dir = %posts_dir.display(), "No posts directory");
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        for path in find_documents(&posts_dir)? {
            if let Some(post) = self.load_post(&path)? {
                posts.push(post);
            }
        }

        sort_posts(&mut posts);
        info!(count = posts.len(), dir = %posts_dir.display(), "Loaded posts");

        Ok(posts)
    }

    pub fn load_post(&mut self, path: &Path) -> Result<Option<Post>, LoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse_post(path, &raw)
    }

    /// Build a post from document text. Returns `None` for drafts.
    pub fn parse_post(&mut self, path: &Path, raw: &str) -> Result<Option<Post>, LoadError> {
        let document = front_matter::parse(raw).map_err(|source| LoadError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?;
        let meta = &document.metadata;

        if meta.is_truthy("draft") {
            debug!(path = %path.display(), "Skipping draft");
            return Ok(None);
        }

        let stem = file_stem(path);
        let title = meta.get_text("title").unwrap_or_else(|| stem.clone());
        let slug = meta.get_text("slug").unwrap_or(stem);

        let raw_date = meta
            .get_truthy_text("date")
            .ok_or_else(|| LoadError::MissingDate(path.to_path_buf()))?;
        let date = parse_field_date("date", &raw_date, path)?;

        let updated = match meta.get_truthy_text("updated") {
            Some(raw_updated) => Some(parse_field_date("updated", &raw_updated, path)?),
            None => None,
        };

        let content = self.markdown.convert(document.body);
        let excerpt = build_excerpt(document.body, EXCERPT_LENGTH);

        debug!(path = %path.display(), slug = %slug, "Parsed post");

        Ok(Some(Post {
            title,
            slug,
            date,
            updated,
            content,
            excerpt,
            source: path.to_path_buf(),
        }))
    }
}

pub fn load_posts<P: AsRef<Path>>(source_dir: P) -> Result<Vec<Post>, LoadError> {
    PostLoader::new(source_dir).load()
}

/// Newest first. The sort is stable, so posts sharing a date keep their
/// discovery order.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Every document under `dir`, in path order.
fn find_documents(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|source| LoadError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension() == Some(OsStr::new(DOCUMENT_EXTENSION)) {
            paths.push(path.to_path_buf());
        }
    }

    paths.sort();
    Ok(paths)
}

fn parse_field_date(
    field: &'static str,
    value: &str,
    path: &Path,
) -> Result<chrono::NaiveDate, LoadError> {
    parse_date(value).map_err(|source| LoadError::InvalidDate {
        field,
        value: value.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn write_post(root: &Path, relative: &str, text: &str) {
        let path = root.join(POSTS_DIR).join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_missing_posts_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_posts(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_fallbacks_to_file_stem() {
        let mut loader = PostLoader::new("content");
        let post = loader
            .parse_post(Path::new("content/posts/hello.md"), "---\ndate: 2024-01-01\n---\nHi\n")
            .unwrap()
            .unwrap();

        assert_eq!(post.title, "hello");
        assert_eq!(post.slug, "hello");
        assert_eq!(post.date_iso(), "2024-01-01");
        assert_eq!(post.updated, None);
    }

    #[test]
    fn test_metadata_overrides_stem() {
        let mut loader = PostLoader::new("content");
        let post = loader
            .parse_post(
                Path::new("content/posts/2024-draft-name.md"),
                "---\ntitle: \"Real Title\"\nslug: real-slug\ndate: 2024-03-05\nupdated: 2024-04-01\n---\nBody\n",
            )
            .unwrap()
            .unwrap();

        assert_eq!(post.title, "Real Title");
        assert_eq!(post.slug, "real-slug");
        assert_eq!(post.updated, Some(date(2024, 4, 1)));
    }

    #[test]
    fn test_empty_title_falls_back() {
        let mut loader = PostLoader::new("content");
        let post = loader
            .parse_post(Path::new("notes.md"), "---\ntitle: ''\nslug: ~\ndate: 2024-01-01\n---\n")
            .unwrap()
            .unwrap();
        assert_eq!(post.title, "notes");
        assert_eq!(post.slug, "notes");
    }

    #[test]
    fn test_draft_is_skipped() {
        let mut loader = PostLoader::new("content");
        let result = loader
            .parse_post(Path::new("wip.md"), "---\ndraft: true\n---\nNo date needed\n")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_draft_false_is_published() {
        let mut loader = PostLoader::new("content");
        let result = loader
            .parse_post(Path::new("done.md"), "---\ndraft: false\ndate: 2024-01-01\n---\n")
            .unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn test_yaml11_false_words_publish_the_post() {
        let mut loader = PostLoader::new("content");
        for word in ["no", "off", "No", "OFF", "n"] {
            let doc = format!("---\ndraft: {word}\ndate: 2024-01-01\n---\nbody\n");
            let result = loader.parse_post(Path::new("kept.md"), &doc).unwrap();
            assert!(result.is_some(), "draft: {word} should publish");
        }

        let result = loader
            .parse_post(Path::new("wip.md"), "---\ndraft: yes\n---\n")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_falsy_updated_is_absent() {
        let mut loader = PostLoader::new("content");
        for value in ["false", "0", "''", "~", "no"] {
            let doc = format!("---\ndate: 2024-01-01\nupdated: {value}\n---\n");
            let post = loader.parse_post(Path::new("p.md"), &doc).unwrap().unwrap();
            assert_eq!(post.updated, None, "updated: {value}");
        }
    }

    #[test]
    fn test_falsy_date_is_missing() {
        let mut loader = PostLoader::new("content");
        let err = loader
            .parse_post(Path::new("zero.md"), "---\ndate: 0\n---\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingDate(_)));
    }

    #[test]
    fn test_missing_date() {
        let mut loader = PostLoader::new("content");
        let err = loader
            .parse_post(Path::new("nodate.md"), "---\ntitle: No date\n---\nBody\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingDate(ref p) if p == Path::new("nodate.md")));
    }

    #[test]
    fn test_document_without_front_matter_needs_date() {
        let mut loader = PostLoader::new("content");
        let err = loader.parse_post(Path::new("plain.md"), "# Plain\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingDate(_)));
    }

    #[test]
    fn test_malformed_dates() {
        let mut loader = PostLoader::new("content");

        let err = loader
            .parse_post(Path::new("bad.md"), "---\ndate: 01/02/2024\n---\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidDate { field: "date", .. }));

        let err = loader
            .parse_post(Path::new("bad.md"), "---\ndate: 2024-01-02\nupdated: soon\n---\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidDate { field: "updated", ref value, .. } if value == "soon"));
    }

    #[test]
    fn test_malformed_front_matter() {
        let mut loader = PostLoader::new("content");
        let err = loader
            .parse_post(Path::new("broken.md"), "---\ntitle: [oops\n---\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::FrontMatter { .. }));
    }

    #[test]
    fn test_content_and_excerpt() {
        let mut loader = PostLoader::new("content");
        let body = format!("## Intro\n\n{}\n", "word ".repeat(60));
        let post = loader
            .parse_post(Path::new("long.md"), &format!("---\ndate: 2024-01-01\n---\n{body}"))
            .unwrap()
            .unwrap();

        assert!(post.content.contains("<h2 id=\"intro\">Intro</h2>"));
        // Excerpt comes from the raw Markdown, not the HTML.
        assert!(post.excerpt.starts_with("## Intro word word"));
        assert!(post.excerpt.ends_with('…'));
        assert!(post.excerpt.chars().count() <= EXCERPT_LENGTH);
    }

    #[test]
    fn test_heading_ids_do_not_leak_between_posts() {
        let mut loader = PostLoader::new("content");
        let doc = "---\ndate: 2024-01-01\n---\n## Setup\n";
        let first = loader.parse_post(Path::new("a.md"), doc).unwrap().unwrap();
        let second = loader.parse_post(Path::new("b.md"), doc).unwrap().unwrap();
        assert_eq!(first.content, second.content);
    }

    #[test]
    fn test_load_sorts_newest_first_and_skips_drafts() {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "old.md", "---\ndate: 2023-05-01\n---\nold\n");
        write_post(dir.path(), "new.md", "---\ndate: 2024-05-01\n---\nnew\n");
        write_post(dir.path(), "nested/mid.md", "---\ndate: 2024-01-01\n---\nmid\n");
        write_post(dir.path(), "hidden.md", "---\ndate: 2025-01-01\ndraft: true\n---\n");
        write_post(dir.path(), "notes.txt", "not a post");

        let posts = load_posts(dir.path()).unwrap();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["new", "mid", "old"]);
    }

    #[test]
    fn test_same_date_keeps_path_order() {
        let dir = TempDir::new().unwrap();
        for name in ["c", "a", "b"] {
            write_post(dir.path(), &format!("{name}.md"), "---\ndate: 2024-01-01\n---\n");
        }
        write_post(dir.path(), "z.md", "---\ndate: 2024-06-01\n---\n");

        let posts = load_posts(dir.path()).unwrap();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["z", "a", "b", "c"]);
    }

    #[test]
    fn test_sort_posts_orders_by_date_desc() {
        let mut loader = PostLoader::new("content");
        let mut posts: Vec<Post> = [(2020, 1, 1), (2022, 6, 30), (2021, 3, 3), (2022, 6, 30)]
            .iter()
            .enumerate()
            .map(|(i, (y, m, d))| {
                let doc = format!("---\ndate: {y:04}-{m:02}-{d:02}\nslug: p{i}\n---\n");
                loader.parse_post(Path::new("x.md"), &doc).unwrap().unwrap()
            })
            .collect();

        sort_posts(&mut posts);

        for pair in posts.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["p1", "p3", "p2", "p0"]);
    }
}
