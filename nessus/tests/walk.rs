use nessus_common::fetcher::FetcherOptions;
use nessus_walker::{
    discover::DiscoveredArtifact,
    retrieve::RetrievingVisitor,
    selection::{Format, Selection},
    session::{Credentials, Session},
    source::{HttpOptions, HttpSource, HttpSourceError, Source},
    visitors::store::StoreVisitor,
    walker::Walker,
};
use std::time::Duration;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path, query_param},
};

const LIST_BODY: &str = r#"<reply>
  <seq>6969</seq>
  <status>OK</status>
  <contents>
    <reports>
      <report>
        <name>ab8d3772-0001</name>
        <readableName>Internal/Scan</readableName>
        <status>completed</status>
        <timestamp>1394647199</timestamp>
      </report>
      <report>
        <name>ab8d3772-0002</name>
        <readableName>DMZ Scan</readableName>
        <status>completed</status>
        <timestamp>1394650000</timestamp>
      </report>
    </reports>
  </contents>
</reply>"#;

const FORMATTING_PAGE: &str = r#"<html><head>
<meta http-equiv="refresh" content="2; url=/file/xslt/download/?fileID=170234.pdf">
<title>Formatting the report</title>
</head><body>please wait</body></html>"#;

fn fast_options() -> HttpOptions {
    HttpOptions::new()
        .initial_delay(Duration::from_millis(5))
        .poll_interval(Duration::from_millis(5))
        .poll_limit(5)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("seq=6969"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "token=deadbeef; path=/"),
        )
        .mount(server)
        .await;
}

async fn mount_list(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/report/list"))
        .and(body_string_contains("seq=6969"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LIST_BODY, "text/xml"))
        .expect(1)
        .mount(server)
        .await;
}

async fn login(server: &MockServer) -> Session {
    let url = Url::parse(&server.uri()).expect("server URL must parse");
    let credentials = Credentials {
        username: "admin".into(),
        password: "s3cret".into(),
    };

    Session::login(url, &credentials, FetcherOptions::new())
        .await
        .expect("login must succeed")
}

#[tokio::test]
async fn login_keeps_cookie_verbatim() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let session = login(&server).await;

    assert_eq!(session.cookie(), "token=deadbeef; path=/");
}

#[tokio::test]
async fn login_without_cookie_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).expect("server URL must parse");
    let credentials = Credentials {
        username: "admin".into(),
        password: "wrong".into(),
    };

    let result = Session::login(url, &credentials, FetcherOptions::new()).await;

    assert!(matches!(
        result,
        Err(nessus_walker::session::LoginError::MissingSessionCookie)
    ));
}

#[tokio::test]
async fn list_reports_in_document_order() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_list(&server).await;

    let source = HttpSource::new(login(&server).await, fast_options());
    let reports = source.load_reports().await.expect("list must succeed");

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].name, "ab8d3772-0001");
    assert_eq!(reports[0].readable_name, "Internal/Scan");
    assert_eq!(reports[1].status, "completed");
    assert_eq!(reports[1].timestamp, "1394650000");
}

/// Downloading every report in the native format issues exactly one GET per report and writes
/// one file per report, named from the display name and timestamp.
#[tokio::test]
async fn download_all_native() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_list(&server).await;

    Mock::given(method("GET"))
        .and(path("/file/report/download/"))
        .and(query_param("report", "ab8d3772-0001"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("scan data one", "application/xml"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file/report/download/"))
        .and(query_param("report", "ab8d3772-0002"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("scan data two", "application/xml"))
        .expect(1)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().expect("must create temp dir");
    let source = HttpSource::new(login(&server).await, fast_options());
    let selection = Selection::parse("all", "0", "").expect("selection must parse");

    Walker::new(source.clone(), selection)
        .walk(RetrievingVisitor::new(
            source,
            StoreVisitor::new(output.path()),
        ))
        .await
        .expect("walk must succeed");

    let one = std::fs::read_to_string(output.path().join("Internal-Scan-1394647199.nessus"))
        .expect("first artifact must exist");
    let two = std::fs::read_to_string(output.path().join("DMZ Scan-1394650000.nessus"))
        .expect("second artifact must exist");
    assert_eq!(one, "scan data one");
    assert_eq!(two, "scan data two");
}

/// A PDF download follows the meta refresh redirect, polls while the server reports that it is
/// still formatting, and fetches the artifact with one final `step=2` request. The file name is
/// the second token of the redirect URL split on `=`.
#[tokio::test]
async fn download_pdf_with_formatting_poll() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_list(&server).await;

    Mock::given(method("GET"))
        .and(path("/chapter"))
        .and(query_param("report", "ab8d3772-0001"))
        .and(query_param("format", "pdf"))
        .and(query_param(
            "chapters",
            "vuln_hosts_summary;vuln_by_plugin;vuln_by_host;remediations;compliance_exec;compliance;",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FORMATTING_PAGE, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    // the first poll still reports formatting, mocks are matched in mount order
    Mock::given(method("GET"))
        .and(path("/file/xslt/download/"))
        .and(query_param("fileID", "170234.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FORMATTING_PAGE, "text/html"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file/xslt/download/"))
        .and(query_param("fileID", "170234.pdf"))
        .and(query_param("step", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4 report", "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file/xslt/download/"))
        .and(query_param("fileID", "170234.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>ready</html>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().expect("must create temp dir");
    let source = HttpSource::new(login(&server).await, fast_options());
    let selection = Selection::parse("0", "2", "all").expect("selection must parse");

    Walker::new(source.clone(), selection)
        .walk(RetrievingVisitor::new(
            source,
            StoreVisitor::new(output.path()),
        ))
        .await
        .expect("walk must succeed");

    let artifact = std::fs::read_to_string(output.path().join("170234.pdf"))
        .expect("artifact must exist");
    assert_eq!(artifact, "%PDF-1.4 report");
}

/// HTML output has no `step=2` stage, the last polled body is the artifact.
#[tokio::test]
async fn download_html_takes_polled_body() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_list(&server).await;

    Mock::given(method("GET"))
        .and(path("/chapter"))
        .and(query_param("format", "html"))
        .and(query_param("chapters", "vuln_by_plugin;"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><meta http-equiv="refresh" content="2; url=/file/xslt/download/?fileID=170235.html"></head></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file/xslt/download/"))
        .and(query_param("fileID", "170235.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>rendered report</html>", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().expect("must create temp dir");
    let source = HttpSource::new(login(&server).await, fast_options());
    let selection = Selection::parse("0", "1", "0").expect("selection must parse");

    Walker::new(source.clone(), selection)
        .walk(RetrievingVisitor::new(
            source,
            StoreVisitor::new(output.path()),
        ))
        .await
        .expect("walk must succeed");

    let artifact = std::fs::read_to_string(output.path().join("170235.html"))
        .expect("artifact must exist");
    assert_eq!(artifact, "<html>rendered report</html>");
}

/// A report which never leaves the formatting state surfaces a distinct timeout error instead
/// of polling forever.
#[tokio::test]
async fn formatting_timeout() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FORMATTING_PAGE, "text/html"))
        .mount(&server)
        .await;

    let source = HttpSource::new(login(&server).await, fast_options());
    let url = source
        .url()
        .join("/chapter?report=ab8d3772-0001&format=pdf&chapters=compliance;")
        .expect("URL must parse");

    let artifact = DiscoveredArtifact {
        report: nessus_walker::model::report::ReportDescriptor {
            name: "ab8d3772-0001".into(),
            readable_name: "Internal/Scan".into(),
            status: "completed".into(),
            timestamp: "1394647199".into(),
        },
        format: Format::Pdf,
        url,
    };

    let result = source.load_artifact(artifact).await;

    assert!(matches!(
        result,
        Err(HttpSourceError::FormattingTimeout { polls: 5 })
    ));
}
