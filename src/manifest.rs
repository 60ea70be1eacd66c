//! Entity manifest rendering
//!
//! Entities are written to the server as a YAML manifest. Rendering is a
//! pure function of the entity's configured attributes so the exact text
//! can be checked without a server.
//!
//! JSON-text attributes (links, relations, licenses, interfaces) that fail
//! to parse or hold nothing are left out of the manifest.
//!
//! Scalars that YAML would read differently from their text (comments,
//! mapping separators, leading indicators, line breaks) are written as
//! double-quoted strings.

use crate::reconcile::Relation;
use crate::resource::entity::EntityModel;
use serde_json::{Map, Value};
use shoehornkit::{LicenseInfo, LinkInfo};
use std::borrow::Cow;
use std::fmt::Write;

/// Render the manifest for an entity.
///
/// The service id is the entity name.
pub fn render_manifest(model: &EntityModel) -> String {
    let mut out = String::new();

    out.push_str("schemaVersion: 1\n\n");
    out.push_str("service:\n");
    line(&mut out, 1, "id", &model.name);
    line(&mut out, 1, "name", &model.name);
    line(&mut out, 1, "type", &model.kind);
    if let Some(tier) = &model.tier {
        line(&mut out, 1, "tier", tier);
    }

    if let Some(description) = &model.description {
        out.push('\n');
        line(&mut out, 0, "description", description);
    }
    if let Some(lifecycle) = &model.lifecycle {
        out.push('\n');
        line(&mut out, 0, "lifecycle", lifecycle);
    }

    if let Some(owner) = &model.owner {
        out.push_str("\nowner:\n");
        out.push_str("  - type: team\n");
        line(&mut out, 2, "id", owner);
    }

    if let Some(tags) = model.tags.as_deref().filter(|t| !t.is_empty()) {
        out.push_str("\ntags:\n");
        for tag in tags {
            let _ = writeln!(out, "  - {}", scalar(tag));
        }
    }

    render_links(&mut out, model.links.as_deref());
    render_relations(&mut out, model.relations.as_deref());
    render_integrations(&mut out, model);
    render_interfaces(&mut out, model.interfaces.as_deref());

    out
}

fn line(out: &mut String, depth: usize, key: &str, value: &str) {
    let _ = writeln!(
        out,
        "{:indent$}{key}: {}",
        "",
        scalar(value),
        indent = depth * 2
    );
}

/// Characters that change meaning at the start of a plain scalar
const LEADING_INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

/// Plain scalar when YAML reads it back verbatim, double-quoted otherwise
fn scalar(value: &str) -> Cow<'_, str> {
    let needs_quotes = value.is_empty()
        || value.starts_with(LEADING_INDICATORS)
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
        || value.ends_with(':')
        || value.contains(": ")
        || value.contains(" #")
        || value.contains(['\n', '\r', '\t']);
    if !needs_quotes {
        return Cow::Borrowed(value);
    }
    // A JSON string literal is a valid YAML double-quoted scalar
    serde_json::to_string(value).map_or(Cow::Borrowed(value), Cow::Owned)
}

fn parse_list<T: serde::de::DeserializeOwned>(text: Option<&str>) -> Vec<T> {
    text.and_then(|t| serde_json::from_str(t).ok())
        .unwrap_or_default()
}

fn render_links(out: &mut String, text: Option<&str>) {
    let links: Vec<LinkInfo> = parse_list(text);
    if links.is_empty() {
        return;
    }
    out.push_str("\nlinks:\n");
    for link in links {
        let _ = writeln!(out, "  - name: {}", scalar(&link.name));
        line(out, 2, "url", &link.url);
        if !link.icon.is_empty() {
            line(out, 2, "icon", &link.icon);
        }
    }
}

fn render_relations(out: &mut String, text: Option<&str>) {
    let relations: Vec<Relation> = parse_list(text);
    if relations.is_empty() {
        return;
    }
    out.push_str("\nrelations:\n");
    for relation in relations {
        let _ = writeln!(out, "  - type: {}", scalar(&relation.kind));
        line(out, 2, "target", &relation.target);
        if !relation.via.is_empty() {
            line(out, 2, "via", &relation.via);
        }
    }
}

fn render_integrations(out: &mut String, model: &EntityModel) {
    if model.changelog_path.is_none() && model.licenses.is_none() {
        return;
    }
    out.push_str("\nintegrations:\n");

    if let Some(path) = &model.changelog_path {
        out.push_str("  changelog:\n");
        line(out, 2, "path", path);
    }

    let licenses: Vec<LicenseInfo> = parse_list(model.licenses.as_deref());
    if licenses.is_empty() {
        return;
    }
    out.push_str("  licenses:\n");
    for license in licenses {
        let _ = writeln!(out, "    - title: {}", scalar(&license.title));
        let optional = [
            ("vendor", &license.vendor),
            ("purchased", &license.purchased),
            ("expires", &license.expires),
        ];
        for (key, value) in optional {
            if !value.is_empty() {
                line(out, 3, key, value);
            }
        }
        if license.seats > 0 {
            line(out, 3, "seats", &license.seats.to_string());
        }
        let optional = [
            ("cost", &license.cost),
            ("contract", &license.contract),
            ("notes", &license.notes),
        ];
        for (key, value) in optional {
            if !value.is_empty() {
                line(out, 3, key, value);
            }
        }
    }
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn render_interfaces(out: &mut String, text: Option<&str>) {
    let Some(interfaces) = text
        .and_then(|t| serde_json::from_str::<Map<String, Value>>(t).ok())
        .filter(|m| !m.is_empty())
    else {
        return;
    };
    out.push_str("\ninterfaces:\n");

    if let Some(http) = interfaces.get("http").and_then(Value::as_object) {
        out.push_str("  http:\n");
        for key in ["baseUrl", "openapi"] {
            if let Some(value) = non_empty_str(http, key) {
                line(out, 2, key, value);
            }
        }
        if let Some(auth) = http.get("auth").and_then(Value::as_object) {
            out.push_str("    auth:\n");
            if let Some(kind) = non_empty_str(auth, "type") {
                line(out, 3, "type", kind);
            }
        }
        if let Some(graphql) = http.get("graphql").and_then(Value::as_object) {
            out.push_str("    graphql:\n");
            for key in ["endpoint", "schema"] {
                if let Some(value) = non_empty_str(graphql, key) {
                    line(out, 3, key, value);
                }
            }
        }
    }

    if let Some(grpc) = interfaces.get("grpc").and_then(Value::as_object) {
        out.push_str("  grpc:\n");
        for key in ["package", "proto"] {
            if let Some(value) = non_empty_str(grpc, key) {
                line(out, 2, key, value);
            }
        }
    }
}
