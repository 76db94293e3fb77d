use site_cloner::config::Config;
use site_cloner::crawler::{build_http_client, HttpLauncher};
use site_cloner::{CloneAccepted, JobStatusReport, SiteCloner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const POLL: Duration = Duration::from_millis(20);

/// A mock site plus a cloner writing into a temporary root
pub struct TestSite {
    pub server: MockServer,
    pub cloner: SiteCloner,
    pub root: TempDir,
}

impl TestSite {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let root = TempDir::new().unwrap();

        let mut config = Config::default();
        config.output.root = root.path().to_path_buf();
        config.browser.enabled = false;

        let client = build_http_client(&config.http).unwrap();
        let cloner = SiteCloner::with_launcher(config, Arc::new(HttpLauncher::new(client))).unwrap();

        Self {
            server,
            cloner,
            root,
        }
    }

    pub fn base(&self) -> String {
        self.server.uri()
    }

    /// Serves `body` as an HTML page at `route`
    pub async fn page(&self, route: &str, body: &str) {
        self.respond(route, html(body)).await;
    }

    pub async fn respond(&self, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Starts a clone of the site root and waits for the crawl to settle
    pub async fn clone_root(&self) -> (CloneAccepted, JobStatusReport) {
        let accepted = self.cloner.start_clone(&self.base()).await.unwrap();
        let report = self
            .cloner
            .wait_for_settled(&accepted.job_id, POLL)
            .await
            .unwrap();
        (accepted, report)
    }

    pub fn job_dir(&self, subdomain: &str) -> PathBuf {
        self.root.path().join(subdomain)
    }

    pub fn read(&self, subdomain: &str, relative: &str) -> String {
        std::fs::read_to_string(self.job_dir(subdomain).join(relative)).unwrap()
    }

    pub fn exists(&self, subdomain: &str, relative: &str) -> bool {
        self.job_dir(subdomain).join(relative).exists()
    }
}

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}
