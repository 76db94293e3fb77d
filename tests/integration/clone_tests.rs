use crate::common::{html, TestSite};
use site_cloner::{CloneError, JobStatus};
use std::time::Duration;
use wiremock::ResponseTemplate;

const ABOUT: &str = "<html><head><title>About Us</title></head><body><h1>About</h1></body></html>";
const CONTACT: &str =
    "<html><head><title>Contact</title></head><body><h1>Contact</h1><a href=\"/\">Home</a></body></html>";

#[tokio::test]
async fn test_home_with_two_subpages() {
    let site = TestSite::start().await;
    site.page(
        "/",
        r#"<html><head><title>Example Home</title></head><body>
        <a href="/about">About</a>
        <a href="/contact#form">Contact</a>
        <a href="https://elsewhere.example.org/">Elsewhere</a>
        </body></html>"#,
    )
    .await;
    site.page("/about", ABOUT).await;
    site.page("/contact", CONTACT).await;

    let (accepted, report) = site.clone_root().await;

    assert_eq!(report.status, JobStatus::Completed, "{:?}", report.error);
    let pages = report.pages.unwrap();
    let filenames: Vec<_> = pages.iter().map(|p| p.filename.as_str()).collect();
    assert_eq!(filenames, vec!["index.html", "_about.html", "_contact.html"]);
    assert!(pages.iter().all(|p| !p.title.is_empty()));
    assert_eq!(pages[0].title, "Example Home");
    assert_eq!(pages[1].title, "About Us");

    let base = format!("/cloned-sites/{}", accepted.subdomain);
    for page in &pages {
        assert_eq!(page.url, format!("{}/{}", base, page.filename));
        assert!(site.exists(&accepted.subdomain, &page.filename));
    }
    assert_eq!(report.url, Some(format!("{}/index.html", base)));

    let index = site.read(&accepted.subdomain, "index.html");
    assert!(index.contains(&format!(r#"href="{}/_about.html""#, base)));
    assert!(index.contains(&format!(r#"href="{}/_contact.html#form""#, base)));
    assert!(index.contains(r#"href="https://elsewhere.example.org/""#));

    // The request URL maps back to the cloned home page
    let contact = site.read(&accepted.subdomain, "_contact.html");
    assert!(contact.contains(&format!(r#"href="{}/index.html""#, base)));
}

#[tokio::test]
async fn test_only_first_ten_stylesheets_are_localized() {
    let site = TestSite::start().await;
    let base = site.base();

    let links: String = (0..12)
        .map(|i| format!(r#"<link rel="stylesheet" href="{}/css/s{}.css">"#, base, i))
        .collect();
    site.page(
        "/",
        &format!("<html><head><title>Styled</title>{}</head><body></body></html>", links),
    )
    .await;
    for i in 0..12 {
        site.respond(
            &format!("/css/s{}.css", i),
            ResponseTemplate::new(200).set_body_string(format!("body {{ order: {}; }}", i)),
        )
        .await;
    }

    let (accepted, report) = site.clone_root().await;
    assert_eq!(report.status, JobStatus::Completed);

    let index = site.read(&accepted.subdomain, "index.html");
    for i in 0..10 {
        assert!(index.contains(&format!(
            r#"href="/cloned-sites/{}/css/style-{}.css""#,
            accepted.subdomain, i
        )));
        assert_eq!(
            site.read(&accepted.subdomain, &format!("css/style-{}.css", i)),
            format!("body {{ order: {}; }}", i)
        );
    }
    for i in 10..12 {
        assert!(index.contains(&format!(r#"href="{}/css/s{}.css""#, base, i)));
        assert!(!site.exists(&accepted.subdomain, &format!("css/style-{}.css", i)));
    }

    let requests = site.server.received_requests().await.unwrap();
    assert!(!requests.iter().any(|r| r.url.path() == "/css/s10.css"));
    assert!(!requests.iter().any(|r| r.url.path() == "/css/s11.css"));
}

#[tokio::test]
async fn test_scripts_and_images() {
    let site = TestSite::start().await;
    let base = site.base();
    site.page(
        "/",
        &format!(
            r#"<html><head><title>Media</title>
            <script src="/js/app.js"></script>
            <script src="{base}/js/vendor.js"></script>
            </head><body>
            <img src="/img/logo.PNG?v=3">
            <img src="data:image/gif;base64,R0lGOD">
            <img src="/img/photo">
            </body></html>"#
        ),
    )
    .await;
    site.respond("/js/app.js", ResponseTemplate::new(200).set_body_string("app();"))
        .await;
    site.respond("/js/vendor.js", ResponseTemplate::new(200).set_body_string("vendor();"))
        .await;
    site.respond(
        "/img/logo.PNG",
        ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G', 0, 1]),
    )
    .await;
    site.respond("/img/photo", ResponseTemplate::new(404)).await;

    let (accepted, report) = site.clone_root().await;
    assert_eq!(report.status, JobStatus::Completed);
    let dir = format!("/cloned-sites/{}", accepted.subdomain);

    let index = site.read(&accepted.subdomain, "index.html");
    assert!(index.contains(&format!(r#"src="{}/js/script-0.js""#, dir)));
    // Absolute script references stay untouched, but the file is still saved
    assert!(index.contains(&format!(r#"src="{}/js/vendor.js""#, base)));
    assert_eq!(site.read(&accepted.subdomain, "js/script-1.js"), "vendor();");

    assert!(index.contains(&format!(r#"src="{}/images/image-0.png""#, dir)));
    assert!(index.contains("data:image/gif;base64,R0lGOD"));
    let logo = std::fs::read(site.job_dir(&accepted.subdomain).join("images/image-0.png")).unwrap();
    assert_eq!(logo, vec![0x89, b'P', b'N', b'G', 0, 1]);

    // A failed download is skipped; the reference is still rewritten
    assert!(index.contains(&format!(r#"src="{}/images/image-1.jpg""#, dir)));
    assert!(!site.exists(&accepted.subdomain, "images/image-1.jpg"));
}

#[tokio::test]
async fn test_credits_are_removed() {
    let site = TestSite::start().await;
    site.page(
        "/",
        r#"<html><head><title>Shop</title></head><body>
        <h1>Welcome to the shop</h1>
        <p class="site-credit">Theme v2</p>
        <footer><span>Website made by Acme Studio</span></footer>
        </body></html>"#,
    )
    .await;

    let (accepted, report) = site.clone_root().await;
    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.pages.unwrap()[0].title, "Shop");

    let index = site.read(&accepted.subdomain, "index.html");
    assert!(index.contains("Welcome to the shop"));
    assert!(!index.contains("Acme Studio"));
    assert!(!index.contains("Theme v2"));
}

#[tokio::test]
async fn test_failed_subpage_is_skipped() {
    let site = TestSite::start().await;
    site.page(
        "/",
        r#"<html><head><title>Home</title></head><body>
        <a href="/gone">Gone</a><a href="/about">About</a>
        </body></html>"#,
    )
    .await;
    site.page("/about", ABOUT).await;

    let (_, report) = site.clone_root().await;

    assert_eq!(report.status, JobStatus::Completed);
    let filenames: Vec<_> = report
        .pages
        .unwrap()
        .into_iter()
        .map(|p| p.filename)
        .collect();
    assert_eq!(filenames, vec!["index.html", "_about.html"]);
}

#[tokio::test]
async fn test_home_failure_fails_the_job() {
    let site = TestSite::start().await;
    site.respond("/", ResponseTemplate::new(500)).await;

    let (_, report) = site.clone_root().await;

    assert_eq!(report.status, JobStatus::Failed);
    assert!(report.pages.is_none());
    assert!(report.url.is_none());
    assert!(report.error.unwrap().contains("500"));
}

#[tokio::test]
async fn test_invalid_url_creates_no_job() {
    let site = TestSite::start().await;

    for input in ["", "not a url", "example.com", "ftp://example.com/file"] {
        let result = site.cloner.start_clone(input).await;
        assert!(matches!(result, Err(CloneError::Validation(_))), "{:?}", input);
    }
    assert!(site.cloner.store().is_empty());
}

#[tokio::test]
async fn test_processing_job_has_no_pages() {
    let site = TestSite::start().await;
    site.respond(
        "/",
        html("<title>Slow</title>").set_delay(Duration::from_millis(400)),
    )
    .await;

    let accepted = site.cloner.start_clone(&site.base()).await.unwrap();
    assert_eq!(accepted.status, JobStatus::Processing);
    assert_eq!(accepted.estimated_time, "5-15 minutes");

    let report = site.cloner.job_status(&accepted.job_id).unwrap();
    assert_eq!(report.status, JobStatus::Processing);
    assert!(report.pages.is_none());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("pages").is_none());

    let report = site
        .cloner
        .wait_for_settled(&accepted.job_id, crate::common::POLL)
        .await
        .unwrap();
    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.pages.unwrap().len(), 1);
}
