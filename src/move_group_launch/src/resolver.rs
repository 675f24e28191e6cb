//! Package share directory lookup

use crate::error::{AssemblyError, Result};
use dashmap::DashMap;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Maps a ROS 2 package name to its installed `share/<package>` directory.
pub trait PackageResolver {
    fn share_directory(&self, package: &str) -> Option<PathBuf>;

    /// Like [`share_directory`](Self::share_directory), but an unknown package is an error.
    fn require_share(&self, package: &str) -> Result<PathBuf> {
        self.share_directory(package)
            .ok_or_else(|| AssemblyError::PackageNotFound(package.to_string()))
    }

    /// Join a relative path onto a package's share directory.
    fn share_path(&self, package: &str, relative: impl AsRef<Path>) -> Result<PathBuf>
    where
        Self: Sized,
    {
        Ok(self.require_share(package)?.join(relative))
    }
}

impl<F> PackageResolver for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn share_directory(&self, package: &str) -> Option<PathBuf> {
        self(package)
    }
}

/// Resolver backed by the ament index environment.
///
/// Searches `AMENT_PREFIX_PATH` first, then `/opt/ros/$ROS_DISTRO`, then the
/// well-known distributions. Hits are cached per package.
#[derive(Debug, Default)]
pub struct AmentResolver {
    cache: DashMap<String, PathBuf>,
}

impl AmentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn search(package: &str) -> Option<PathBuf> {
        if let Ok(prefix_path) = std::env::var("AMENT_PREFIX_PATH") {
            for prefix in prefix_path.split(':').filter(|p| !p.is_empty()) {
                let share_path = Path::new(prefix).join("share").join(package);
                if share_path.is_dir() {
                    return Some(share_path);
                }
            }
        }

        if let Ok(distro) = std::env::var("ROS_DISTRO") {
            let share_path = PathBuf::from(format!("/opt/ros/{}/share/{}", distro, package));
            if share_path.is_dir() {
                return Some(share_path);
            }
        }

        for distro in &["jazzy", "iron", "humble", "galactic", "foxy"] {
            let share_path = PathBuf::from(format!("/opt/ros/{}/share/{}", distro, package));
            if share_path.is_dir() {
                return Some(share_path);
            }
        }

        None
    }
}

impl PackageResolver for AmentResolver {
    fn share_directory(&self, package: &str) -> Option<PathBuf> {
        if let Some(hit) = self.cache.get(package) {
            return Some(hit.clone());
        }

        let found = Self::search(package)?;
        log::debug!("Package {} -> {}", package, found.display());
        self.cache.insert(package.to_string(), found.clone());
        Some(found)
    }
}

/// Explicit package table, optionally layered over another resolver.
#[derive(Default)]
pub struct StaticResolver {
    packages: HashMap<String, PathBuf>,
    fallback: Option<Box<dyn PackageResolver>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every package resolves to `<root>/<package>`, like a merged install's `share/`.
    pub fn with_share_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self::new().with_fallback(move |package: &str| Some(root.join(package)))
    }

    pub fn with_package(mut self, package: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.insert(package, dir);
        self
    }

    pub fn with_fallback(mut self, fallback: impl PackageResolver + 'static) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn insert(&mut self, package: impl Into<String>, dir: impl Into<PathBuf>) {
        self.packages.insert(package.into(), dir.into());
    }
}

impl PackageResolver for StaticResolver {
    fn share_directory(&self, package: &str) -> Option<PathBuf> {
        self.packages
            .get(package)
            .cloned()
            .or_else(|| self.fallback.as_deref()?.share_directory(package))
    }
}
