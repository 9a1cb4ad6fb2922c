use chrono::Utc;
use serde_json::{json, Map, Value};

/// A kind of cluster object the dispatcher knows how to route
///
/// Each kind carries its plural URL segment and the API group prefix it
/// lives under: build-family objects are served from the `oapi` group,
/// core objects such as secrets from the core `api` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    BuildConfig,
    Build,
    ImageStream,
    Secret,
}

impl ResourceKind {
    /// The `kind` tag carried on descriptors of this kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResourceKind::BuildConfig => "BuildConfig",
            ResourceKind::Build => "Build",
            ResourceKind::ImageStream => "ImageStream",
            ResourceKind::Secret => "Secret",
        }
    }

    /// The plural URL segment for this kind
    pub fn url_segment(&self) -> &'static str {
        match self {
            ResourceKind::BuildConfig => "buildconfigs",
            ResourceKind::Build => "builds",
            ResourceKind::ImageStream => "imagestreams",
            ResourceKind::Secret => "secrets",
        }
    }

    /// The API group prefix this kind is served under
    pub fn api_group_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Secret => "api",
            _ => "oapi",
        }
    }

    /// Default payload for this kind, merged under a caller-supplied
    /// descriptor with caller-wins semantics.
    ///
    /// The descriptor is consulted because some defaults derive from it
    /// (the image stream `build` label mirrors `metadata.name`).
    pub fn defaults(&self, descriptor: &Value) -> Value {
        match self {
            ResourceKind::BuildConfig => json!({
                "kind": "BuildConfig",
                "apiVersion": "v1",
                "metadata": {},
                "spec": {},
            }),
            ResourceKind::Build => json!({
                "kind": "Build",
                "apiVersion": "v1",
                "metadata": {},
            }),
            ResourceKind::ImageStream => json!({
                "kind": "ImageStream",
                "apiVersion": "v1",
                "metadata": {
                    "creationTimestamp": format_timestamp(),
                    "labels": {
                        "build": descriptor
                            .pointer("/metadata/name")
                            .and_then(Value::as_str)
                            .unwrap_or_default(),
                    },
                },
                "spec": {},
                "status": {
                    "dockerImageRepository": "",
                },
            }),
            ResourceKind::Secret => json!({
                "kind": "Secret",
                "apiVersion": "v1",
                "metadata": {
                    "creationTimestamp": format_timestamp(),
                },
                "type": "Opaque",
            }),
        }
    }

    /// Merge this kind's defaults into a caller-supplied descriptor.
    ///
    /// Shallow merge at the top level; build configs additionally merge
    /// default spec fields under the caller's `spec` so a partial spec is
    /// filled out rather than clobbered.
    pub fn apply_defaults(&self, descriptor: Value) -> Value {
        let defaults = self.defaults(&descriptor);
        let mut merged = merge_shallow(descriptor, defaults);
        if let ResourceKind::BuildConfig = self {
            let spec_defaults = json!({
                "runPolicy": "Serial",
                "source": {},
                "strategy": {
                    "type": "Docker",
                },
            });
            if let Some(spec) = merged.get_mut("spec") {
                let filled = merge_shallow(spec.take(), spec_defaults);
                *spec = filled;
            }
        }
        merged
    }
}

/// Default payload for the build-request wrapper posted to the
/// `instantiate` sub-path.
pub fn build_request_defaults() -> Value {
    json!({
        "kind": "BuildRequest",
        "apiVersion": "v1",
        "metadata": {
            "creationTimestamp": format_timestamp(),
        },
    })
}

/// Merge build-request defaults into a caller-supplied request.
pub fn apply_build_request_defaults(request: Value) -> Value {
    merge_shallow(request, build_request_defaults())
}

/// Shallow merge: caller value wins, defaults fill the gaps.
///
/// Non-object inputs pass through unchanged (nothing to merge into).
pub fn merge_shallow(descriptor: Value, defaults: Value) -> Value {
    match (descriptor, defaults) {
        (Value::Object(mut descriptor), Value::Object(defaults)) => {
            for (key, value) in defaults {
                descriptor.entry(key).or_insert(value);
            }
            Value::Object(descriptor)
        }
        (descriptor, _) => descriptor,
    }
}

/// Rewrite a partial descriptor for merge-patch submission.
///
/// Empty-string leaves become explicit `null` so the server unsets them:
/// merge-patch treats omission as "leave unchanged" and only an explicit
/// null as removal. A `sourceSecret` reference whose `name` was unset is
/// collapsed to `null` as a whole: the server only removes the reference
/// when its container is null, not when a leaf inside it is.
pub fn normalize_patch(mut partial: Value) -> Value {
    unset_empty_strings(&mut partial);
    collapse_unset_source_secret(&mut partial);
    partial
}

fn unset_empty_strings(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (_, nested) in map.iter_mut() {
                unset_empty_strings(nested);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                unset_empty_strings(item);
            }
        }
        Value::String(s) if s.is_empty() => *value = Value::Null,
        _ => {}
    }
}

fn collapse_unset_source_secret(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if key == "sourceSecret" && name_is_unset(nested) {
                    *nested = Value::Null;
                } else {
                    collapse_unset_source_secret(nested);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                collapse_unset_source_secret(item);
            }
        }
        _ => {}
    }
}

fn name_is_unset(reference: &Value) -> bool {
    matches!(reference.get("name"), Some(Value::Null))
}

/// Creation timestamp in the fixed wire format: UTC, second precision,
/// literal `Z` suffix.
pub fn format_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Extract the `items` sequence from a list response body.
///
/// A list body with no `items` yields an empty sequence.
pub fn list_items(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// An empty descriptor, the soft result for 404-style lookups.
pub fn empty_descriptor() -> Value {
    Value::Object(Map::new())
}
