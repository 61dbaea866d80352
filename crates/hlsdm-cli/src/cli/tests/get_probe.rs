//! Tests for get and probe subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use hlsdm_core::job::OutputKind;

#[test]
fn cli_parse_get_defaults() {
    match parse(&["hlsdm", "get", "https://example.com/a.m3u8"]) {
        CliCommand::Get {
            urls,
            title,
            stream,
            kind,
            start,
            end,
            variant,
            dir,
            interactive,
        } => {
            assert_eq!(urls, vec!["https://example.com/a.m3u8"]);
            assert!(title.is_none());
            assert!(!stream);
            assert!(kind.is_none());
            assert!(start.is_none() && end.is_none());
            assert_eq!(variant, 0);
            assert!(dir.is_none());
            assert!(!interactive);
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_all_flags() {
    match parse(&[
        "hlsdm",
        "get",
        "https://example.com/a.m3u8",
        "https://example.com/b.m3u8",
        "--title",
        "Evening News",
        "--stream",
        "--kind",
        "MP4",
        "--start",
        "3",
        "--end",
        "10",
        "--variant",
        "2",
        "--dir",
        "/tmp/videos",
        "-i",
    ]) {
        CliCommand::Get {
            urls,
            title,
            stream,
            kind,
            start,
            end,
            variant,
            dir,
            interactive,
        } => {
            assert_eq!(urls.len(), 2);
            assert_eq!(title.as_deref(), Some("Evening News"));
            assert!(stream);
            assert_eq!(kind, Some(OutputKind::Mp4));
            assert_eq!((start, end), (Some(3), Some(10)));
            assert_eq!(variant, 2);
            assert_eq!(dir.as_deref(), Some(std::path::Path::new("/tmp/videos")));
            assert!(interactive);
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_get_requires_url_and_known_kind() {
    assert!(Cli::try_parse_from(["hlsdm", "get"]).is_err());
    assert!(Cli::try_parse_from(["hlsdm", "get", "u", "--kind", "mkv"]).is_err());
}

#[test]
fn cli_parse_probe() {
    match parse(&["hlsdm", "probe", "https://example.com/master.m3u8", "--json"]) {
        CliCommand::Probe { url, json } => {
            assert_eq!(url, "https://example.com/master.m3u8");
            assert!(json);
        }
        _ => panic!("expected Probe"),
    }
}
