//! Glob-based file discovery shared by the file-scanning loaders

use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::Workspace;

/// Discovery filters for one loader: include glob, exclude glob, and whether
/// to search below the workspace roots.
#[derive(Debug, Clone)]
pub struct FilePattern {
    /// Include patterns as written (brace groups expanded)
    includes: Vec<String>,
    excludes: Vec<Pattern>,
    /// Include patterns prefixed with `**/`, used for matching arbitrary
    /// paths (watch events) and for subdirectory search
    deep_includes: Vec<Pattern>,
    search_subdirectories: bool,
}

impl FilePattern {
    pub fn new(include: &str, exclude: &str, search_subdirectories: bool) -> Result<Self> {
        let includes = quicktask_config::expand_braces(include);

        let mut deep_includes = Vec::new();
        for pattern in &includes {
            deep_includes.push(Pattern::new(&deepen(pattern))?);
        }

        let mut excludes = Vec::new();
        for pattern in quicktask_config::expand_braces(exclude) {
            excludes.push(Pattern::new(&pattern)?);
        }

        Ok(Self {
            includes,
            excludes,
            deep_includes,
            search_subdirectories,
        })
    }

    /// Whether a path (from a watch event) belongs to this loader
    pub fn matches(&self, path: &Path) -> bool {
        if self.excludes.iter().any(|p| p.matches_path(path)) {
            return false;
        }
        self.deep_includes.iter().any(|p| p.matches_path(path))
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excludes.iter().any(|p| p.matches_path(path))
    }

    /// Enumerate matching files under every workspace root. The filesystem
    /// walk is synchronous (the `glob` crate drives it), so it runs on the
    /// blocking pool.
    pub async fn find_files(&self, workspace: &Workspace) -> Result<Vec<PathBuf>> {
        let pattern = self.clone();
        let roots: Vec<PathBuf> = workspace.roots().iter().map(|r| r.path.clone()).collect();

        let found = tokio::task::spawn_blocking(move || pattern.walk(&roots))
            .await
            .map_err(|e| crate::error::RegistryError::Scan(e.to_string()))??;

        Ok(found)
    }

    fn walk(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        for root in roots {
            for include in &self.includes {
                let glob_pattern = if self.search_subdirectories && !include.starts_with("**/") {
                    root.join("**").join(include)
                } else {
                    root.join(include)
                };

                let entries = glob::glob(&glob_pattern.to_string_lossy())?;
                for entry in entries.flatten() {
                    if entry.is_file() && !self.is_excluded(&entry) {
                        found.push(entry);
                    }
                }
            }
        }

        found.sort();
        found.dedup();
        Ok(found)
    }
}

/// Prefix a pattern with `**/` so it matches at any depth
fn deepen(pattern: &str) -> String {
    if pattern.starts_with("**/") {
        pattern.to_string()
    } else {
        format!("**/{}", pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_deep_path() {
        let pattern = FilePattern::new("package.json", "**/node_modules/**", false).unwrap();
        assert!(pattern.matches(Path::new("/work/app/package.json")));
        assert!(!pattern.matches(Path::new("/work/app/node_modules/x/package.json")));
        assert!(!pattern.matches(Path::new("/work/app/Cargo.toml")));
    }

    #[test]
    fn test_matches_brace_alternatives() {
        let pattern = FilePattern::new("*.{sh,py}", "", false).unwrap();
        assert!(pattern.matches(Path::new("/work/deploy.sh")));
        assert!(pattern.matches(Path::new("/work/tool.py")));
        assert!(!pattern.matches(Path::new("/work/tool.rb")));
    }

    #[tokio::test]
    async fn test_find_files_respects_subdirectory_flag() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/package.json"), "{}").unwrap();

        let workspace = Workspace::single(dir.path());

        let shallow = FilePattern::new("package.json", "", false).unwrap();
        assert_eq!(shallow.find_files(&workspace).await.unwrap().len(), 1);

        let deep = FilePattern::new("package.json", "", true).unwrap();
        assert_eq!(deep.find_files(&workspace).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_files_exclude() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/dep")).unwrap();
        std::fs::write(dir.path().join("node_modules/dep/package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();

        let workspace = Workspace::single(dir.path());
        let pattern = FilePattern::new("package.json", "**/node_modules/**", true).unwrap();

        let found = pattern.find_files(&workspace).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(!found[0].to_string_lossy().contains("node_modules"));
    }
}
