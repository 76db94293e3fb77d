use crate::common::{html, TestSite, POLL};
use site_cloner::config::OutputConfig;
use site_cloner::output::{finalize_site, SiteLayout};
use site_cloner::{CloneError, JobStatus};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const HOME: &str = r#"<html><head><title>Home</title>
<link rel="stylesheet" href="/style.css">
</head><body>
<a href="/about">About</a>
<img src="/logo.svg">
</body></html>"#;

const ABOUT: &str = r#"<html><head><title>About</title>
<link rel="stylesheet" href="/style.css">
</head><body><a href="/">Back home</a></body></html>"#;

async fn cloned_site() -> (TestSite, String, String) {
    let site = TestSite::start().await;
    site.page("/", HOME).await;
    site.page("/about", ABOUT).await;
    site.respond(
        "/style.css",
        wiremock::ResponseTemplate::new(200).set_body_string("h1 { color: red }"),
    )
    .await;
    site.respond(
        "/logo.svg",
        wiremock::ResponseTemplate::new(200).set_body_string("<svg></svg>"),
    )
    .await;

    let (accepted, report) = site.clone_root().await;
    assert_eq!(report.status, JobStatus::Completed, "{:?}", report.error);
    (site, accepted.job_id, accepted.subdomain)
}

fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "html"))
        .map(|path| {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            (name, std::fs::read(&path).unwrap())
        })
        .collect()
}

#[tokio::test]
async fn test_finalize_lifecycle() {
    let (site, job_id, subdomain) = cloned_site().await;

    let report = site.cloner.finalize(&job_id).await.unwrap();
    assert!(report.success);
    assert_eq!(report.job_id, job_id);
    assert_eq!(report.status, JobStatus::Finalized);

    let status = site.cloner.job_status(&job_id).unwrap();
    assert_eq!(status.status, JobStatus::Finalized);
    let pages = status.pages.unwrap();
    assert_eq!(pages.len(), 2);
    for page in &pages {
        assert_eq!(page.url, page.filename);
    }

    let index = site.read(&subdomain, "index.html");
    assert!(index.contains(r#"href="_about.html""#));
    assert!(index.contains(r#"href="css/style-0.css""#));
    assert!(index.contains(r#"src="images/image-0.svg""#));
    assert!(!index.contains("/cloned-sites/"));

    let about = site.read(&subdomain, "_about.html");
    assert!(about.contains(r#"href="index.html""#));
    assert!(about.contains(r#"href="css/style-0.css""#));
}

#[tokio::test]
async fn test_finalize_is_idempotent_on_disk() {
    let (site, job_id, subdomain) = cloned_site().await;
    site.cloner.finalize(&job_id).await.unwrap();

    let dir = site.job_dir(&subdomain);
    let first = snapshot(&dir);

    let output = OutputConfig {
        root: site.root.path().to_path_buf(),
        ..OutputConfig::default()
    };
    let stats = finalize_site(&SiteLayout::new(&output, &subdomain))
        .await
        .unwrap();

    assert_eq!(stats.files_scanned, 2);
    assert_eq!(stats.files_rewritten, 0);
    assert_eq!(snapshot(&dir), first);
}

#[tokio::test]
async fn test_finalize_rejects_processing_and_unknown_jobs() {
    let site = TestSite::start().await;
    site.respond(
        "/",
        html("<title>Slow</title>").set_delay(Duration::from_millis(400)),
    )
    .await;

    let accepted = site.cloner.start_clone(&site.base()).await.unwrap();
    match site.cloner.finalize(&accepted.job_id).await {
        Err(CloneError::InvalidState { job_id, status }) => {
            assert_eq!(job_id, accepted.job_id);
            assert_eq!(status, JobStatus::Processing);
        }
        other => panic!("expected invalid state, got {:?}", other),
    }

    assert!(matches!(
        site.cloner.finalize("job_0_00000000").await,
        Err(CloneError::NotFound(_))
    ));

    // Once completed the same job finalizes normally
    site.cloner
        .wait_for_settled(&accepted.job_id, POLL)
        .await
        .unwrap();
    assert!(site.cloner.finalize(&accepted.job_id).await.is_ok());
}

#[tokio::test]
async fn test_finalize_rejects_failed_jobs() {
    let site = TestSite::start().await;
    site.respond("/", wiremock::ResponseTemplate::new(503)).await;

    let (accepted, report) = site.clone_root().await;
    assert_eq!(report.status, JobStatus::Failed);

    assert!(matches!(
        site.cloner.finalize(&accepted.job_id).await,
        Err(CloneError::InvalidState {
            status: JobStatus::Failed,
            ..
        })
    ));
}
