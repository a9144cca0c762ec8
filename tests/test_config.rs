use owlet::config::{Config, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_SPOOL_THRESHOLD};
use std::io::Write as _;
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.server.max_workers, 2);
    assert_eq!(cfg.static_files.root, PathBuf::from("static"));
    assert_eq!(cfg.static_files.route_prefix, "/static/");
    assert!(cfg.static_files.cache);
    assert!(cfg.static_files.range);
    assert!(!cfg.static_files.chunked);
    assert_eq!(cfg.static_files.max_chunk_size, DEFAULT_MAX_CHUNK_SIZE);
    assert_eq!(cfg.limits.spool_threshold, DEFAULT_SPOOL_THRESHOLD);
}

#[test]
fn test_partial_yaml_overrides_keep_other_defaults() {
    let cfg = Config::from_yaml(
        r#"
server:
  listen_addr: "0.0.0.0:9000"
static_files:
  root: "/srv/assets"
  chunked: true
"#,
    )
    .unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:9000");
    // Unset fields fall back to defaults.
    assert_eq!(cfg.server.max_workers, 2);
    assert_eq!(cfg.static_files.root, PathBuf::from("/srv/assets"));
    assert!(cfg.static_files.chunked);
    assert_eq!(cfg.static_files.route_prefix, "/static/");
    assert_eq!(cfg.limits.spool_threshold, DEFAULT_SPOOL_THRESHOLD);
}

#[test]
fn test_full_yaml() {
    let cfg = Config::from_yaml(
        r#"
server:
  listen_addr: "127.0.0.1:8888"
  max_workers: 16
  backlog: 256
static_files:
  root: "public"
  route_prefix: "/assets/"
  cache: false
  chunked: false
  range: false
  max_chunk_size: 65536
uploads:
  root: "/var/uploads"
templates:
  root: "tpl"
limits:
  spool_threshold: 4096
"#,
    )
    .unwrap();

    assert_eq!(cfg.server.max_workers, 16);
    assert_eq!(cfg.server.backlog, 256);
    assert_eq!(cfg.static_files.route_prefix, "/assets/");
    assert!(!cfg.static_files.cache);
    assert!(!cfg.static_files.range);
    assert_eq!(cfg.static_files.max_chunk_size, 65536);
    assert_eq!(cfg.uploads.root, PathBuf::from("/var/uploads"));
    assert_eq!(cfg.templates.root, PathBuf::from("tpl"));
    assert_eq!(cfg.limits.spool_threshold, 4096);
}

#[test]
fn test_from_file() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "server:\n  listen_addr: \"127.0.0.1:7070\"").unwrap();
    let cfg = Config::from_file(tmp.path().to_str().unwrap()).unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:7070");
}

#[test]
fn test_invalid_yaml_is_an_error() {
    assert!(Config::from_yaml("server: [not, a, map]").is_err());
}
