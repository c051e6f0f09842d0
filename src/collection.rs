use std::collections::HashMap;

use spdlog::warn;

use crate::error::{LoadError, ValidationError};
use crate::front_matter;
use crate::post::Post;
use crate::text_utils::slug_from_name;

/// One candidate document as handed over by the source: its name and its
/// raw text. No ordering is assumed of the source; the builder imposes its
/// own.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub name: String,
    pub raw: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> SourceDocument {
        SourceDocument {
            name: name.into(),
            raw: raw.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub name: String,
    pub error: LoadError,
}

/// The result of one load cycle: posts that passed validation, most recent
/// first, plus every document that did not and why. Rebuilt wholesale on
/// every call; nothing is retained between builds.
pub struct PostCollection {
    pub published: Vec<Post>,
    pub rejected: Vec<Rejected>,
    slug_index: HashMap<String, usize>,
}

impl PostCollection {
    /// Runs every document through the parser and the validator. A failing
    /// document lands in `rejected` and never aborts the batch.
    pub fn build(documents: Vec<SourceDocument>) -> PostCollection {
        let mut candidates: Vec<(String, Post)> = vec![];
        let mut rejected: Vec<Rejected> = vec![];

        for doc in documents {
            let (mapping, body) = match front_matter::parse(&doc.raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    rejected.push(Rejected { name: doc.name, error: e.into() });
                    continue;
                }
            };

            let slug = slug_from_name(&doc.name);
            match Post::from_document(&slug, &mapping, &body) {
                Ok(post) => {
                    if post.body.is_empty() {
                        warn!("Post {} has an empty body", doc.name);
                    }
                    candidates.push((doc.name, post));
                }
                Err(e) => rejected.push(Rejected { name: doc.name, error: e.into() }),
            }
        }

        // Most recent first; the slug breaks date ties so rebuilds of the
        // same batch always come out in the same order
        candidates.sort_by(|a, b| {
            let (_, pa) = a;
            let (_, pb) = b;
            pb.published_at.cmp(&pa.published_at)
                .then_with(|| pa.slug.cmp(&pb.slug))
        });

        // First occurrence in sorted order wins a slug; later (older)
        // duplicates are rejected rather than silently shadowed
        let mut published: Vec<Post> = vec![];
        let mut slug_index: HashMap<String, usize> = HashMap::new();

        for (name, post) in candidates {
            if slug_index.contains_key(&post.slug) {
                rejected.push(Rejected {
                    name,
                    error: ValidationError::duplicate_slug(&post.slug).into(),
                });
                continue;
            }
            slug_index.insert(post.slug.clone(), published.len());
            published.push(post);
        }

        PostCollection {
            published,
            rejected,
            slug_index,
        }
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Post> {
        match self.slug_index.get(slug) {
            Some(&index) => Some(&self.published[index]),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.published.len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ParseError, ValidationKind};
    use crate::test_data::{POST_HELLO, POST_NO_TITLE};

    use super::*;

    fn doc(name: &str, raw: &str) -> SourceDocument {
        SourceDocument::new(name, raw)
    }

    fn dated(title: &str, date: &str) -> String {
        format!("---\ntitle: {}\ndate: {}\n---\nBody\n", title, date)
    }

    #[test]
    fn test_happy_case() {
        let collection = PostCollection::build(vec![
            doc("2015-04-18-hello-world.md", POST_HELLO),
        ]);

        assert_eq!(collection.len(), 1);
        assert!(collection.rejected.is_empty());
        assert_eq!(collection.published[0].slug, "hello-world");
    }

    #[test]
    fn test_sort_order() {
        let collection = PostCollection::build(vec![
            doc("january.md", &dated("January", "2025-01-01")),
            doc("june.md", &dated("June", "2025-06-01")),
            doc("december.md", &dated("December", "2024-12-31")),
        ]);

        let dates: Vec<String> = collection.published.iter()
            .map(|p| p.published_at.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(dates, ["2025-06-01", "2025-01-01", "2024-12-31"]);
    }

    #[test]
    fn test_date_ties_break_on_slug() {
        let collection = PostCollection::build(vec![
            doc("zebra.md", &dated("Zebra", "2025-01-01")),
            doc("alpha.md", &dated("Alpha", "2025-01-01")),
        ]);

        let slugs: Vec<&str> = collection.published.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["alpha", "zebra"]);
    }

    #[test]
    fn test_duplicate_slug_newest_wins() {
        let collection = PostCollection::build(vec![
            doc("2025-01-01-hello-world.md", &dated("Hello earlier", "2025-01-01")),
            doc("2025-02-01-hello-world.md", &dated("Hello later", "2025-02-01")),
        ]);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.published[0].title, "Hello later");

        assert_eq!(collection.rejected.len(), 1);
        let rejected = &collection.rejected[0];
        assert_eq!(rejected.name, "2025-01-01-hello-world.md");
        match &rejected.error {
            LoadError::Validation(e) => {
                assert_eq!(e.kind, ValidationKind::DuplicateSlug);
                assert_eq!(e.field.as_deref(), Some("hello-world"));
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_documents_never_publish() {
        let collection = PostCollection::build(vec![
            doc("good.md", &dated("Good", "2025-03-01")),
            doc("no-title.md", POST_NO_TITLE),
            doc("no-date.md", "---\ntitle: Missing date\n---\nBody\n"),
        ]);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.rejected.len(), 2);

        let kinds: Vec<(&str, ValidationKind)> = collection.rejected.iter()
            .map(|r| match &r.error {
                LoadError::Validation(e) => (r.name.as_str(), e.kind),
                other => panic!("expected a validation error, got {:?}", other),
            })
            .collect();
        assert!(kinds.contains(&("no-title.md", ValidationKind::MissingField)));
        assert!(kinds.contains(&("no-date.md", ValidationKind::MissingField)));
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let collection = PostCollection::build(vec![
            doc("broken.md", "---\ntitle: Broken\ndate: 2025-01-01\n"),
        ]);

        assert!(collection.is_empty());
        assert_eq!(collection.rejected.len(), 1);
        assert_eq!(
            collection.rejected[0].error,
            LoadError::Parse(ParseError::new(3, "front matter block is never closed"))
        );
    }

    #[test]
    fn test_idempotence() {
        let documents = vec![
            doc("2015-04-18-hello-world.md", POST_HELLO),
            doc("june.md", &dated("June", "2025-06-01")),
            doc("no-title.md", POST_NO_TITLE),
            doc("hello-world.md", &dated("Shadowed", "2014-01-01")),
        ];

        let first = PostCollection::build(documents.clone());
        let second = PostCollection::build(documents);

        assert_eq!(first.published, second.published);
        assert_eq!(first.rejected, second.rejected);
    }

    #[test]
    fn test_find_by_slug() {
        let collection = PostCollection::build(vec![
            doc("2015-04-18-hello-world.md", POST_HELLO),
            doc("june.md", &dated("June", "2025-06-01")),
        ]);

        let post = collection.find_by_slug("hello-world").unwrap();
        assert_eq!(post.title, "Hello, World");

        assert!(collection.find_by_slug("nope").is_none());
    }

    #[test]
    fn test_empty_batch() {
        let collection = PostCollection::build(vec![]);
        assert!(collection.is_empty());
        assert!(collection.rejected.is_empty());
        assert!(collection.find_by_slug("anything").is_none());
    }
}
