//! Tests for `vendor` flag parsing and job merging.

use super::parse;
use crate::cli::commands::vendor::job_from_args;
use crate::cli::{Cli, CliCommand, VendorArgs};
use clap::Parser;
use esmvend_core::config::{EntryUrls, VendorConfig};
use esmvend_core::error::VendorError;
use std::io::Write;
use std::path::PathBuf;

fn vendor_args(args: &[&str]) -> VendorArgs {
    match parse(args) {
        CliCommand::Vendor(a) => a,
        other => panic!("expected Vendor, got {other:?}"),
    }
}

#[test]
fn cli_parse_vendor_long_flags() {
    let a = vendor_args(&[
        "esmvend",
        "vendor",
        "--url",
        "https://esm.sh/react@18",
        "--output",
        "vendor",
        "--import-name",
        "react",
        "--jobs",
        "3",
    ]);
    assert_eq!(a.urls, vec!["https://esm.sh/react@18"]);
    assert_eq!(a.output, Some(PathBuf::from("vendor")));
    assert_eq!(a.import_name.as_deref(), Some("react"));
    assert_eq!(a.jobs, Some(3));
    assert!(a.config.is_none());
}

#[test]
fn cli_parse_vendor_short_and_repeated_url() {
    let a = vendor_args(&[
        "esmvend",
        "vendor",
        "-u",
        "https://esm.sh/a",
        "-u",
        "https://esm.sh/b",
        "-o",
        "out",
    ]);
    assert_eq!(a.urls, vec!["https://esm.sh/a", "https://esm.sh/b"]);
    assert_eq!(a.output, Some(PathBuf::from("out")));
}

#[test]
fn cli_parse_vendor_without_flags_is_accepted() {
    // Missing url/output is reported by job validation, not by clap.
    let a = vendor_args(&["esmvend", "vendor"]);
    assert!(a.urls.is_empty());
    assert!(a.output.is_none());
}

#[test]
fn cli_parse_vendor_rejects_non_numeric_jobs() {
    assert!(Cli::try_parse_from(["esmvend", "vendor", "--jobs", "many"]).is_err());
}

#[test]
fn flags_override_job_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"url": "https://esm.sh/from-file", "outputDir": "file-out", "importName": "lib"}}"#
    )
    .unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let a = vendor_args(&["esmvend", "vendor", "--config", &path, "-o", "flag-out"]);
    let job = job_from_args(&a).unwrap();
    assert_eq!(
        job.url,
        Some(EntryUrls::One("https://esm.sh/from-file".to_string()))
    );
    assert_eq!(job.output, Some(PathBuf::from("flag-out")));
    assert_eq!(job.import_name.as_deref(), Some("lib"));
}

#[test]
fn missing_url_is_config_error() {
    let a = vendor_args(&["esmvend", "vendor", "-o", "out"]);
    let err = job_from_args(&a)
        .unwrap()
        .into_options(&VendorConfig::default())
        .unwrap_err();
    assert!(matches!(err, VendorError::Config(_)));
}

#[test]
fn missing_job_file_is_error() {
    let a = vendor_args(&["esmvend", "vendor", "--config", "/nonexistent/job.yaml"]);
    assert!(job_from_args(&a).is_err());
}
