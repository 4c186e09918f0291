//! OVA download tests for vcd-test-harness.
// crates/vcd-test-harness/tests/download.rs
// =============================================================================
// Module: Download Tests
// Description: Fetch fixture files from a local HTTP server.
// Purpose: Ensure bodies are streamed to disk and failures leave no file.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::fs;
use std::thread;

use tiny_http::Response;
use tiny_http::Server;
use vcd_test_config::LoggingSettings;
use vcd_test_config::SuiteResourceNames;
use vcd_test_harness::download::DownloadError;
use vcd_test_harness::download::download_file;
use vcd_test_harness::fixtures::FixtureOutcome;
use vcd_test_harness::fixtures::provision_suite_fixtures;

use crate::common::FakePlatform;
use crate::common::TestResult;
use crate::common::base_config;

/// Serves `status` with `body` to a single request and returns the URL.
fn serve_once(status: u16, body: &'static [u8]) -> (String, thread::JoinHandle<String>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}/fixtures/test_vapp_template.ova");
    let handle = thread::spawn(move || {
        let Ok(request) = server.recv() else {
            return String::new();
        };
        let user_agent = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("User-Agent"))
            .map(|header| header.value.to_string())
            .unwrap_or_default();
        let response = Response::from_data(body).with_status_code(status);
        let _ = request.respond(response);
        user_agent
    });
    (url, handle)
}

#[test]
fn body_is_written_to_the_target_file() -> TestResult {
    let (url, handle) = serve_once(200, b"ova-bytes");
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let target = dir.path().join("vapp.ova");

    let written = download_file(&target, &url).map_err(|err| err.to_string())?;
    let user_agent = handle.join().unwrap();

    assert_eq!(written, 9);
    assert_eq!(fs::read(&target).unwrap(), b"ova-bytes");
    assert!(user_agent.starts_with("terraform-provider-vcd/test"));
    Ok(())
}

#[test]
fn error_status_creates_no_file() {
    let (url, handle) = serve_once(404, b"missing");
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("vapp.ova");

    let err = download_file(&target, &url).unwrap_err();
    handle.join().unwrap();

    assert!(matches!(err, DownloadError::Status { status: 404, .. }));
    assert!(!target.exists());
}

#[test]
fn unreachable_server_is_a_request_error() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    drop(server);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("vapp.ova");

    let err = download_file(&target, &format!("http://{addr}/vapp.ova")).unwrap_err();
    assert!(matches!(err, DownloadError::Request { .. }));
    assert!(!target.exists());
}

#[test]
fn provisioning_downloads_missing_ova() -> TestResult {
    let (url, handle) = serve_once(200, b"ova-bytes");
    let platform = FakePlatform::with_org("datacloud");
    let mut config = base_config();
    config.ova.ova_download_url = url;
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let ova = dir.path().join("test_vapp_template.ova");

    let report = provision_suite_fixtures(
        &platform,
        &config,
        &LoggingSettings::default(),
        &SuiteResourceNames::default(),
        &ova,
    )
    .map_err(|err| err.to_string())?;
    handle.join().unwrap();

    assert_eq!(report.catalog_item, FixtureOutcome::Created);
    assert_eq!(fs::read(&ova).unwrap(), b"ova-bytes");
    Ok(())
}
