//! Crawler coordinator - main clone orchestration logic
//!
//! This module contains the per-job pipeline, including:
//! - Rendering and discovering the home page
//! - Planning the link map and creating the output layout
//! - Downloading assets through a bounded pool
//! - Rewriting and writing the home page and each subpage
//! - Recording the outcome in the job store
//!
//! Only failures of the home page phase are fatal to a job. A failed asset
//! download or subpage navigation is logged and skipped. A failed document
//! write is fatal.

use crate::config::{validate, Config};
use crate::crawler::fetcher::{fetch, FetchOptions};
use crate::crawler::link_map::{LinkMap, PlannedPage, HOME_FILENAME};
use crate::crawler::parser::{discover_home, AssetDownload};
use crate::crawler::renderer::{render, BrowserLauncher, BrowserSession};
use crate::output::SiteLayout;
use crate::rewrite::{AssetKind, RewriteContext, Rewriter};
use crate::storage::{JobStorage, PageRecord};
use crate::CloneError;
use futures::stream::{self, StreamExt, TryStreamExt};
use futures::FutureExt;
use reqwest::Client;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use url::Url;

/// Title recorded for a home page without `<title>`
const DEFAULT_HOME_TITLE: &str = "Homepage";

/// One accepted clone request
#[derive(Debug, Clone)]
pub struct CloneRequest {
    pub job_id: String,
    /// The URL exactly as submitted
    pub raw_url: String,
    pub url: Url,
    pub subdomain: String,
}

/// Main clone coordinator structure
///
/// One coordinator serves every job of a process; each call to
/// [`Coordinator::run`] launches its own browser session.
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    launcher: Arc<dyn BrowserLauncher>,
    rewriter: Rewriter,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `client` - HTTP client used for asset downloads
    /// * `launcher` - Opens the per-job rendering session
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CloneError)` - The configuration failed validation
    pub fn new(
        config: Arc<Config>,
        client: Client,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, CloneError> {
        validate(&config)?;
        let rewriter = Rewriter::from_config(&config)?;
        Ok(Self {
            config,
            client,
            launcher,
            rewriter,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs a job and records its outcome in `store`
    ///
    /// The job moves to `completed` with its pages, or to `failed` with the
    /// error message.
    pub async fn execute(&self, store: &dyn JobStorage, request: &CloneRequest) {
        let outcome = self.run(request).await;

        let recorded = match outcome {
            Ok(pages) => {
                tracing::info!(
                    job_id = %request.job_id,
                    pages = pages.len(),
                    "Clone completed"
                );
                store.complete_job(&request.job_id, pages, request.url.as_str())
            }
            Err(e) => {
                tracing::error!(job_id = %request.job_id, error = %e, "Clone failed");
                store.fail_job(&request.job_id, &e.to_string())
            }
        };

        if let Err(e) = recorded {
            tracing::error!(job_id = %request.job_id, error = %e, "Failed to record job outcome");
        }
    }

    /// Runs the pipeline and returns the page records
    ///
    /// Exactly one session is launched and it is closed exactly once after the
    /// crawl ends, whether it succeeded, failed or panicked.
    pub async fn run(&self, request: &CloneRequest) -> Result<Vec<PageRecord>, CloneError> {
        let mut session = self.launcher.launch().await?;

        let crawled = AssertUnwindSafe(self.crawl(request, &*session))
            .catch_unwind()
            .await;

        session.close().await;
        tracing::debug!(job_id = %request.job_id, "Browser session released");

        match crawled {
            Ok(result) => result,
            Err(payload) => Err(CloneError::Panicked(panic_message(payload))),
        }
    }

    async fn crawl(
        &self,
        request: &CloneRequest,
        session: &dyn BrowserSession,
    ) -> Result<Vec<PageRecord>, CloneError> {
        let job_id = request.job_id.as_str();

        // Home page: every failure from here to the home document write is fatal
        tracing::info!(job_id, stage = "render", url = %request.url, "Rendering home page");
        let home_html = render(session, &request.url, self.config.timeouts.home_page()).await?;

        let discovery = discover_home(&home_html, &request.url, &self.config.limits);
        tracing::info!(
            job_id,
            stage = "discover",
            subpages = discovery.subpages.len(),
            assets = discovery.assets.len(),
            "Home page discovered"
        );

        let layout = SiteLayout::new(&self.config.output, &request.subdomain);
        let (link_map, planned) = LinkMap::plan(
            &request.raw_url,
            &request.url,
            &discovery.subpages,
            layout.public_base(),
        );

        layout.create_dirs().await?;
        tracing::debug!(job_id, dir = %layout.dir().display(), "Output directories created");

        let downloaded = self.download_assets(job_id, &layout, &discovery.assets).await;
        tracing::info!(
            job_id,
            stage = "assets",
            downloaded,
            planned = discovery.assets.len(),
            "Assets downloaded"
        );

        let ctx = RewriteContext {
            page_url: &request.url,
            public_base: layout.public_base(),
            link_map: &link_map,
        };
        let (html, _, stats) = self.rewriter.rewrite_html(&home_html, &ctx);
        layout.write(HOME_FILENAME, html).await?;
        tracing::info!(
            job_id,
            stage = "home",
            assets = stats.assets,
            credits_removed = stats.credits_removed,
            links = stats.links,
            "Home page written"
        );

        let mut pages = Vec::with_capacity(planned.len() + 1);
        pages.push(PageRecord {
            title: discovery
                .title
                .unwrap_or_else(|| DEFAULT_HOME_TITLE.to_string()),
            url: layout.public_path(HOME_FILENAME),
            filename: HOME_FILENAME.to_string(),
        });

        // Subpages: navigation failures skip the page, write failures abort
        let subpages: Vec<Option<PageRecord>> = stream::iter(planned)
            .map(|page| self.process_subpage(job_id, session, &layout, &link_map, page))
            .buffered(self.config.concurrency.subpage_renders)
            .try_collect()
            .await?;
        pages.extend(subpages.into_iter().flatten());

        Ok(pages)
    }

    async fn download_assets(&self, job_id: &str, layout: &SiteLayout, assets: &[AssetDownload]) -> usize {
        let client = &self.client;
        let timeout = self.config.timeouts.asset();

        let saved: Vec<bool> = stream::iter(assets.iter().cloned())
            .map(move |asset| async move {
                let options = FetchOptions {
                    timeout,
                    binary: asset.kind == AssetKind::Image,
                };

                let bytes = match fetch(client, &asset.url, options).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(job_id, stage = "assets", url = %asset.url, error = %e, "Asset download failed");
                        return false;
                    }
                };

                match layout.write(&asset.local_path, bytes).await {
                    Ok(_) => {
                        tracing::debug!(job_id, kind = %asset.kind, position = asset.position, "Asset saved");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(job_id, stage = "assets", path = %asset.local_path, error = %e, "Asset write failed");
                        false
                    }
                }
            })
            .buffer_unordered(self.config.concurrency.asset_downloads)
            .collect()
            .await;

        saved.into_iter().filter(|ok| *ok).count()
    }

    async fn process_subpage(
        &self,
        job_id: &str,
        session: &dyn BrowserSession,
        layout: &SiteLayout,
        link_map: &LinkMap,
        page: PlannedPage,
    ) -> Result<Option<PageRecord>, CloneError> {
        let html = match render(session, &page.url, self.config.timeouts.subpage()).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(job_id, stage = "subpage", url = %page.url, error = %e, "Skipping subpage");
                return Ok(None);
            }
        };

        let ctx = RewriteContext {
            page_url: &page.url,
            public_base: layout.public_base(),
            link_map,
        };
        let (html, title, _) = self.rewriter.rewrite_html(&html, &ctx);
        layout.write(&page.filename, html).await?;
        tracing::debug!(job_id, stage = "subpage", file = %page.filename, "Subpage written");

        let title = title.unwrap_or_else(|| {
            page.filename
                .strip_suffix(".html")
                .unwrap_or(&page.filename)
                .to_string()
        });

        Ok(Some(PageRecord {
            title,
            url: layout.public_path(&page.filename),
            filename: page.filename,
        }))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
