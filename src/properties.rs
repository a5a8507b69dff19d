//! Per-file transport properties: inferred content type plus rule overrides.
//!
//! Rules are an ordered sequence of `(pattern, properties)` pairs. The first
//! rule whose pattern matches the destination-relative path supplies the
//! properties; later matching rules are ignored. Rule fields are merged on
//! top of the content type inferred from the file name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pattern::{PatternError, PatternSet};

/// Properties applied to an uploaded object.
///
/// Field names follow the S3 request parameters so a YAML rule reads like the
/// put request it produces (`ContentType`, `CacheControl`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ObjectProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    #[serde(default, rename = "ACL", skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
    /// User metadata (`x-amz-meta-*`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ObjectProperties {
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer `self` over `base`: every field set here replaces the one in
    /// `base`, metadata keys are merged with `self` winning.
    pub fn merged_over(&self, base: &ObjectProperties) -> ObjectProperties {
        let pick = |top: &Option<String>, bottom: &Option<String>| {
            top.clone().or_else(|| bottom.clone())
        };
        let mut metadata = base.metadata.clone();
        metadata.extend(self.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
        ObjectProperties {
            content_type: pick(&self.content_type, &base.content_type),
            cache_control: pick(&self.cache_control, &base.cache_control),
            content_encoding: pick(&self.content_encoding, &base.content_encoding),
            content_disposition: pick(&self.content_disposition, &base.content_disposition),
            content_language: pick(&self.content_language, &base.content_language),
            storage_class: pick(&self.storage_class, &base.storage_class),
            acl: pick(&self.acl, &base.acl),
            metadata,
        }
    }
}

/// A single `pattern -> properties` rule as declared in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRule {
    pub pattern: String,
    #[serde(default)]
    pub properties: ObjectProperties,
}

impl PropertyRule {
    pub fn new(pattern: impl Into<String>, properties: ObjectProperties) -> Self {
        Self {
            pattern: pattern.into(),
            properties,
        }
    }
}

/// Compiled, ordered property rules.
#[derive(Debug, Clone, Default)]
pub struct PropertyRules {
    patterns: PatternSet,
    properties: Vec<ObjectProperties>,
}

impl PropertyRules {
    pub fn new(rules: Vec<PropertyRule>) -> Result<Self, PatternError> {
        let patterns = PatternSet::new(rules.iter().map(|r| r.pattern.clone()))?;
        let properties = rules.into_iter().map(|r| r.properties).collect();
        Ok(Self {
            patterns,
            properties,
        })
    }

    /// The properties of the first rule matching `relative_path`, or an
    /// empty bag.
    pub fn resolve(&self, relative_path: &str) -> ObjectProperties {
        self.lookup(relative_path)
            .map(|(_, props)| props.clone())
            .unwrap_or_default()
    }

    /// Matching pattern and its properties, if any.
    pub fn lookup(&self, relative_path: &str) -> Option<(&str, &ObjectProperties)> {
        let index = self.patterns.first_match_index(relative_path)?;
        Some((
            self.patterns.patterns()[index].as_str(),
            &self.properties[index],
        ))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// MIME type inferred from the extension of `name`.
pub fn content_type_for(name: &str) -> Option<&'static str> {
    mime_guess::from_path(name).first_raw()
}

/// Full property set for an upload: inferred content type with the matching
/// rule layered on top.
pub fn upload_properties(relative_path: &str, rules: &PropertyRules) -> ObjectProperties {
    let inferred = content_type_for(relative_path)
        .map(ObjectProperties::with_content_type)
        .unwrap_or_default();
    rules.resolve(relative_path).merged_over(&inferred)
}
