use bucket_publish::pattern::PatternSet;
use bucket_publish::properties::{
    content_type_for, upload_properties, ObjectProperties, PropertyRule, PropertyRules,
};

#[test]
fn first_declared_pattern_wins() {
    let set = PatternSet::new(["*.txt", "a.*", "*"]).unwrap();
    assert_eq!(set.first_match("a.txt"), Some("*.txt"));
    assert_eq!(set.first_match("a.css"), Some("a.*"));
    assert_eq!(set.first_match("b.css"), Some("*"));
}

#[test]
fn star_does_not_cross_directories() {
    let set = PatternSet::new(["*.map"]).unwrap();
    assert!(set.is_match("app.js.map"));
    assert!(!set.is_match("js/app.js.map"));

    let recursive = PatternSet::new(["**/*.map"]).unwrap();
    assert!(recursive.is_match("js/app.js.map"));
    assert!(recursive.is_match("app.js.map"));
}

#[test]
fn empty_set_matches_nothing() {
    let set = PatternSet::empty();
    assert!(set.is_empty());
    assert_eq!(set.first_match("anything"), None);
}

#[test]
fn invalid_pattern_names_the_pattern() {
    let err = PatternSet::new(["ok/*", "[broken"]).unwrap_err();
    assert_eq!(err.pattern, "[broken");
}

#[test]
fn unmatched_path_resolves_to_empty_bag() {
    let rules = PropertyRules::new(vec![PropertyRule::new(
        "*.html",
        ObjectProperties::with_content_type("text/html"),
    )])
    .unwrap();
    assert!(rules.resolve("style.css").is_empty());
}

#[test]
fn resolution_is_deterministic() {
    let mut long_cache = ObjectProperties::default();
    long_cache.cache_control = Some("max-age=31536000".into());
    let rules = PropertyRules::new(vec![
        PropertyRule::new("assets/*", long_cache.clone()),
        PropertyRule::new("**", ObjectProperties::with_content_type("application/x-other")),
    ])
    .unwrap();

    let first = rules.resolve("assets/app.js");
    for _ in 0..10 {
        assert_eq!(rules.resolve("assets/app.js"), first);
    }
    assert_eq!(first, long_cache);
    assert_eq!(rules.lookup("assets/app.js").map(|(p, _)| p), Some("assets/*"));
}

#[test]
fn rule_content_type_overrides_inferred_one() {
    let rules = PropertyRules::new(vec![PropertyRule::new(
        "*.html",
        ObjectProperties::with_content_type("text/html; charset=utf-8"),
    )])
    .unwrap();

    let props = upload_properties("index.html", &rules);
    assert_eq!(props.content_type.as_deref(), Some("text/html; charset=utf-8"));
}

#[test]
fn inferred_content_type_survives_rules_without_one() {
    let mut gzip = ObjectProperties::default();
    gzip.content_encoding = Some("gzip".into());
    let rules = PropertyRules::new(vec![PropertyRule::new("*.js", gzip)]).unwrap();

    let props = upload_properties("app.js", &rules);
    assert_eq!(props.content_type.as_deref(), content_type_for("app.js"));
    assert_eq!(props.content_encoding.as_deref(), Some("gzip"));
}

#[test]
fn unknown_extension_has_no_content_type() {
    assert_eq!(content_type_for("LICENSE"), None);
    assert!(upload_properties("LICENSE", &PropertyRules::default()).is_empty());
}

#[test]
fn metadata_merges_with_rule_winning() {
    let mut base = ObjectProperties::default();
    base.metadata.insert("owner".into(), "web".into());
    base.metadata.insert("tier".into(), "cold".into());
    let mut top = ObjectProperties::default();
    top.metadata.insert("tier".into(), "hot".into());

    let merged = top.merged_over(&base);
    assert_eq!(merged.metadata.get("owner").map(String::as_str), Some("web"));
    assert_eq!(merged.metadata.get("tier").map(String::as_str), Some("hot"));
}

#[test]
fn properties_deserialise_with_s3_field_names() {
    let yaml = r#"
ContentType: "text/html; charset=utf-8"
CacheControl: no-cache
ACL: public-read
Metadata:
  build: "42"
"#;
    let props: ObjectProperties = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(props.content_type.as_deref(), Some("text/html; charset=utf-8"));
    assert_eq!(props.cache_control.as_deref(), Some("no-cache"));
    assert_eq!(props.acl.as_deref(), Some("public-read"));
    assert_eq!(props.metadata.get("build").map(String::as_str), Some("42"));
}
