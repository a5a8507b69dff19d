use bucket_publish::load_config::load_config;
use bucket_publish::publish::Invalidation;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

/// A complete config maps every section onto the publish config.
#[test]
fn test_load_config_full() {
    let file = config_file(
        r#"
bucket: my-bucket
destination: site/
clean: false
exclude: ["*.map", "**/.DS_Store"]
properties:
  - pattern: "*.html"
    properties:
      ContentType: "text/html; charset=utf-8"
      CacheControl: no-cache
  - pattern: "assets/*"
    properties:
      CacheControl: "max-age=31536000"
files:
  - dist/robots.txt
directories:
  - dist/site
invalidation:
  distribution_id: E2EXAMPLE
  paths: ["/index.html"]
aws:
  region: eu-west-1
  endpoint_url: http://localhost:9000
"#,
    );

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.publish.bucket, "my-bucket");
    assert_eq!(config.publish.destination, "site/");
    assert!(!config.publish.clean);
    assert_eq!(config.publish.exclude, vec!["*.map", "**/.DS_Store"]);
    assert_eq!(config.publish.properties.len(), 2);
    assert_eq!(config.publish.properties[0].pattern, "*.html");
    assert_eq!(
        config.publish.properties[0].properties.content_type.as_deref(),
        Some("text/html; charset=utf-8")
    );
    assert_eq!(config.publish.properties[1].pattern, "assets/*");
    assert_eq!(config.files, vec![PathBuf::from("dist/robots.txt")]);
    assert_eq!(config.directories, vec![PathBuf::from("dist/site")]);
    assert_eq!(
        config.publish.invalidation,
        Invalidation::Enabled {
            distribution_id: "E2EXAMPLE".into(),
            paths: vec!["/index.html".into()],
        }
    );
    assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:9000"));
}

/// Only the bucket is required; everything else has defaults.
#[test]
fn test_load_config_defaults() {
    let file = config_file("bucket: my-bucket\n");

    let config = load_config(file.path()).expect("Minimal config should load");

    assert_eq!(config.publish.destination, "");
    assert!(config.publish.clean, "clean defaults to true");
    assert!(config.publish.properties.is_empty());
    assert!(config.publish.exclude.is_empty());
    assert_eq!(config.publish.invalidation, Invalidation::Disabled);
    assert!(config.files.is_empty());
    assert!(config.directories.is_empty());
    assert_eq!(config.aws, Default::default());
}

#[test]
fn test_load_config_invalidation_paths_default_to_whole_distribution() {
    let file = config_file("bucket: b\ninvalidation:\n  distribution_id: E1\n");

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.publish.invalidation, Invalidation::whole_distribution("E1"));
}

#[test]
fn test_load_config_rejects_empty_invalidation_paths() {
    let file = config_file("bucket: b\ninvalidation:\n  distribution_id: E1\n  paths: []\n");

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("invalidation.paths"), "got: {err}");
}

#[test]
fn test_load_config_errors_on_missing_bucket() {
    let file = config_file("destination: site\n");

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("parse"), "got: {err}");
}

#[test]
fn test_load_config_errors_on_unknown_property_field() {
    let file = config_file(concat!(
        "bucket: b\n",
        "properties:\n",
        "  - pattern: \"*.html\"\n",
        "    properties:\n",
        "      ContentTyp: text/html\n",
    ));

    assert!(load_config(file.path()).is_err());
}

/// If the config file is not valid YAML, load_config errors and reports as such.
#[test]
fn test_load_config_errors_for_invalid_file() {
    let file = config_file("not-yaml: [:::");

    let err = load_config(file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
