use std::{fs, io};
use std::path::{Path, PathBuf};

use crate::collection::SourceDocument;

/// Filesystem document source. Posts live under `root_dir` either as flat
/// markdown files or as one directory per post holding `post_file` inside.
pub struct PostList {
    pub root_dir: PathBuf,
    pub post_file: String,
}

impl PostList {
    pub fn new(root_dir: PathBuf, post_file: &str) -> PostList {
        PostList {
            root_dir,
            post_file: post_file.to_string(),
        }
    }

    /// Reads every candidate document under the root. Flat files are named
    /// by their file name, directory posts by their directory name.
    pub fn retrieve_documents(&self) -> io::Result<Vec<SourceDocument>> {
        let mut documents = vec![];

        for path in self.retrieve_files()? {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                let raw = fs::read_to_string(&path)?;
                documents.push(SourceDocument::new(name, raw));
            }
        }

        for (dir, file_name) in self.retrieve_dirs()? {
            if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                let raw = fs::read_to_string(dir.join(&file_name))?;
                documents.push(SourceDocument::new(name, raw));
            }
        }

        Ok(documents)
    }

    fn retrieve_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut posts = vec![];
        let entries = fs::read_dir(self.root_dir.as_path())?;
        for entry in entries {
            if let Ok(entry) = entry {
                if let Ok(file_type) = entry.file_type() {
                    if !file_type.is_file() {
                        continue;
                    }
                    let file_name = entry.file_name();
                    if let Some(file_name) = file_name.to_str() {
                        if file_name.ends_with(".md") || file_name.ends_with(".markdown") {
                            posts.push(entry.path());
                        }
                    }
                }
            }
        }
        Ok(posts)
    }

    fn retrieve_dirs(&self) -> io::Result<Vec<(PathBuf, String)>> {
        // Per directory, we should have a file called post.md
        let dirs = Self::list_dirs(self.root_dir.as_path())?;
        // Filtering only the dirs with a post inside
        Self::filter_dirs(&self.post_file, dirs)
    }

    fn list_dirs(posts_dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs: Vec<PathBuf> = vec![];
        let entries = fs::read_dir(posts_dir)?;
        for entry in entries {
            if let Ok(path) = entry {
                if let Ok(file_type) = path.file_type() {
                    if file_type.is_dir() {
                        dirs.push(path.path());
                    }
                }
            }
        }
        Ok(dirs)
    }

    fn filter_dirs(post_file: &str, dirs: Vec<PathBuf>) -> io::Result<Vec<(PathBuf, String)>> {
        let mut post_dirs = vec![];
        for dir in dirs {
            if let Some(file_name) = Self::contains_file(&dir, post_file)? {
                post_dirs.push((dir, file_name));
            }
        }
        Ok(post_dirs)
    }

    fn contains_file(dir: &PathBuf, base_name: &str) -> io::Result<Option<String>> {
        let entries = fs::read_dir(dir)?;
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(file_name) = entry.file_name().to_str() {
                    if file_name == base_name {
                        return Ok(Some(file_name.to_string()));
                    }
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::collection::PostCollection;

    use super::*;

    #[test]
    fn test_retrieve_documents() -> io::Result<()> {
        let post_list = PostList::new(PathBuf::from("res/posts"), "index.md");

        let documents = post_list.retrieve_documents()?;
        let mut names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        names.sort();

        assert_eq!(names, [
            "2015-04-18-hello-world.md",
            "2015-05-02-reading-list.md",
            "project-retrospective",
        ]);
        Ok(())
    }

    #[test]
    fn test_build_collection_from_fixtures() -> io::Result<()> {
        let post_list = PostList::new(PathBuf::from("res/posts"), "index.md");
        let collection = PostCollection::build(post_list.retrieve_documents()?);

        assert_eq!(collection.len(), 3);
        assert!(collection.rejected.is_empty());

        let slugs: Vec<&str> = collection.published.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["project-retrospective", "reading-list", "hello-world"]);

        Ok(())
    }
}
