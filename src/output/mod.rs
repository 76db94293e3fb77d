//! Output module for the on-disk layout of a clone
//!
//! This module handles:
//! - The directory of a job (`<root>/<subdomain>`) and its `css/`, `js/`,
//!   `images/` subdirectories
//! - Site-absolute public paths (`<public-prefix>/<subdomain>/...`)
//! - Writing documents and assets
//! - Finalization (site-absolute to directory-relative references)

mod finalize;

pub use finalize::{finalize_site, relativize_html, FinalizeStats};

use crate::config::OutputConfig;
use crate::rewrite::AssetKind;
use std::io;
use std::path::{Path, PathBuf};

/// Locations of one job's output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    dir: PathBuf,
    public_base: String,
}

impl SiteLayout {
    /// Layout for `subdomain` under the configured output root
    ///
    /// # Example
    ///
    /// ```
    /// use site_cloner::config::OutputConfig;
    /// use site_cloner::output::SiteLayout;
    ///
    /// let layout = SiteLayout::new(&OutputConfig::default(), "example-com-1");
    /// assert_eq!(layout.public_base(), "/cloned-sites/example-com-1");
    /// assert_eq!(layout.public_path("index.html"), "/cloned-sites/example-com-1/index.html");
    /// ```
    pub fn new(output: &OutputConfig, subdomain: &str) -> Self {
        Self {
            dir: output.root.join(subdomain),
            public_base: format!(
                "{}/{}",
                output.public_prefix.trim_end_matches('/'),
                subdomain
            ),
        }
    }

    /// Directory holding the job's documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Site-absolute job directory, without trailing slash
    pub fn public_base(&self) -> &str {
        &self.public_base
    }

    /// Site-absolute path of a file inside the job directory
    pub fn public_path(&self, relative: &str) -> String {
        format!("{}/{}", self.public_base, relative)
    }

    /// Filesystem path of a file inside the job directory
    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.dir.join(relative)
    }

    /// Creates the job directory and the asset subdirectories
    pub async fn create_dirs(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        for kind in AssetKind::ALL {
            tokio::fs::create_dir_all(self.dir.join(kind.dir())).await?;
        }
        Ok(())
    }

    /// Writes a file inside the job directory, replacing any existing one
    pub async fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let path = self.path_of(relative);
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}
