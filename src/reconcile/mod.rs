//! State reconciliation
//!
//! The server may return sub-collections in any order and never echoes
//! write-once secrets. The helpers here keep a refresh from reporting drift
//! that is not real:
//!
//! - Sub-collections persisted as JSON text (relations, links, licenses,
//!   interfaces, team members) are compared as multisets under a per-field
//!   signature. When the previous and refreshed text are equivalent, the
//!   previous text is kept verbatim.
//! - Secrets (raw API keys, agent tokens, masked integration config) are
//!   carried forward from the previous state.
//! - Team membership changes are sent as an add/remove diff
//!   ([`members::compute_member_diff`]).

pub mod members;

pub use members::{Member, compute_member_diff, parse_members};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shoehornkit::{LicenseInfo, LinkInfo};
use std::collections::BTreeSet;

/// A relation as persisted in state: the target is joined as
/// `targetType:targetId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub via: String,
}

/// Compare two JSON arrays as multisets of element signatures
///
/// Text that does not parse is never equivalent to anything.
fn equivalent_by<T, F>(a: &str, b: &str, signature: F) -> bool
where
    T: DeserializeOwned,
    F: Fn(&T) -> String,
{
    let (Ok(left), Ok(right)) = (
        serde_json::from_str::<Vec<T>>(a),
        serde_json::from_str::<Vec<T>>(b),
    ) else {
        return false;
    };
    if left.len() != right.len() {
        return false;
    }

    let mut left: Vec<String> = left.iter().map(&signature).collect();
    let mut right: Vec<String> = right.iter().map(&signature).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}

/// Relations match on `type|target`; `via` is ignored.
pub fn relations_equivalent(a: &str, b: &str) -> bool {
    equivalent_by(a, b, |r: &Relation| format!("{}|{}", r.kind, r.target))
}

/// Links match on `name|url|icon`.
pub fn links_equivalent(a: &str, b: &str) -> bool {
    equivalent_by(a, b, |l: &LinkInfo| format!("{}|{}|{}", l.name, l.url, l.icon))
}

/// Licenses match on every field.
pub fn licenses_equivalent(a: &str, b: &str) -> bool {
    equivalent_by(a, b, |l: &LicenseInfo| {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            l.title, l.vendor, l.purchased, l.expires, l.seats, l.cost, l.contract, l.notes
        )
    })
}

/// Members match on `user_id|role`, so a role change is a different member.
pub fn members_equivalent(a: &str, b: &str) -> bool {
    equivalent_by(a, b, |m: &Member| format!("{}|{}", m.user_id, m.role))
}

/// Interfaces are arbitrary nested objects; compare their canonical text.
pub fn interfaces_equivalent(a: &str, b: &str) -> bool {
    objects_equivalent(a, b)
}

/// Two JSON objects with the same content, whatever their key order
pub fn objects_equivalent(a: &str, b: &str) -> bool {
    let (Ok(left), Ok(right)) = (
        serde_json::from_str::<Map<String, Value>>(a),
        serde_json::from_str::<Map<String, Value>>(b),
    ) else {
        return false;
    };
    canonical_json(&Value::Object(left)) == canonical_json(&Value::Object(right))
}

/// Serialize with object keys sorted at every depth
pub fn canonical_json(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// Tags are a set: order and duplicates do not matter.
pub fn same_set(a: &[String], b: &[String]) -> bool {
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

/// Keep the previous serialization when the refreshed one means the same
///
/// Returns `fresh` unless both sides are present and `equivalent` holds.
pub fn preserve_if_equivalent(
    field: &str,
    previous: Option<&String>,
    fresh: Option<String>,
    equivalent: fn(&str, &str) -> bool,
) -> Option<String> {
    match (previous, fresh) {
        (Some(previous), Some(fresh)) if equivalent(previous, &fresh) => {
            if *previous != fresh {
                log::debug!("Keeping previous {field}: equivalent to refreshed value");
            }
            Some(previous.clone())
        }
        (_, fresh) => fresh,
    }
}

/// Keep a write-once value the server no longer returns
pub fn carry_forward<T: Clone>(field: &str, previous: Option<&T>, fresh: Option<T>) -> Option<T> {
    match fresh {
        Some(value) => Some(value),
        None => {
            if previous.is_some() {
                log::debug!("Carrying {field} forward from state");
            }
            previous.cloned()
        }
    }
}

/// Encode a value as compact JSON text
pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    serde_json::to_string(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_relations_order_insensitive() {
        let a = r#"[{"type":"depends_on","target":"service:db"},{"type":"owned_by","target":"team:platform"}]"#;
        let b = r#"[{"type":"owned_by","target":"team:platform"},{"type":"depends_on","target":"service:db"}]"#;
        assert!(relations_equivalent(a, b));
    }

    #[test]
    fn test_relations_ignore_via() {
        let a = r#"[{"type":"depends_on","target":"service:db","via":"grpc"}]"#;
        let b = r#"[{"type":"depends_on","target":"service:db"}]"#;
        assert!(relations_equivalent(a, b));
    }

    #[test]
    fn test_relations_different_target() {
        let a = r#"[{"type":"depends_on","target":"service:db"}]"#;
        let b = r#"[{"type":"depends_on","target":"service:cache"}]"#;
        assert!(!relations_equivalent(a, b));
    }

    #[test]
    fn test_cardinality_mismatch() {
        let a = r#"[{"type":"x","target":"a:b"}]"#;
        let b = r#"[{"type":"x","target":"a:b"},{"type":"x","target":"a:b"}]"#;
        assert!(!relations_equivalent(a, b));
    }

    #[test]
    fn test_duplicates_count_as_multiset() {
        let a = r#"[{"name":"a","url":"u"},{"name":"b","url":"u"}]"#;
        let b = r#"[{"name":"a","url":"u"},{"name":"a","url":"u"}]"#;
        assert!(!links_equivalent(a, b));
        assert!(!links_equivalent(b, a));
    }

    #[test]
    fn test_invalid_json_never_equivalent() {
        assert!(!relations_equivalent("not json", "[]"));
        assert!(!relations_equivalent("[]", "{"));
        assert!(!interfaces_equivalent("[]", "[]"));
    }

    #[test]
    fn test_links_icon_matters() {
        let a = r#"[{"name":"Docs","url":"https://d","icon":"book"}]"#;
        let b = r#"[{"name":"Docs","url":"https://d"}]"#;
        assert!(!links_equivalent(a, b));
    }

    #[test]
    fn test_licenses_any_field_breaks() {
        let a = r#"[{"title":"Pro","vendor":"Acme","seats":10}]"#;
        let b = r#"[{"title":"Pro","vendor":"Acme","seats":11}]"#;
        assert!(!licenses_equivalent(a, b));
        assert!(licenses_equivalent(a, r#"[{"seats":10,"vendor":"Acme","title":"Pro"}]"#));
    }

    #[test]
    fn test_members_role_matters() {
        let a = r#"[{"user_id":"u1","role":"admin"}]"#;
        let b = r#"[{"user_id":"u1","role":"member"}]"#;
        assert!(!members_equivalent(a, b));
        assert!(members_equivalent(r#"[{"user_id":"u1"}]"#, r#"[{"user_id":"u1","role":""}]"#));
    }

    #[test]
    fn test_interfaces_nested_key_order() {
        let a = r#"{"http":{"baseUrl":"https://api","auth":{"type":"oauth2"}},"grpc":{"package":"p"}}"#;
        let b = r#"{"grpc":{"package":"p"},"http":{"auth":{"type":"oauth2"},"baseUrl":"https://api"}}"#;
        assert!(interfaces_equivalent(a, b));
        assert!(!interfaces_equivalent(a, r#"{"grpc":{"package":"q"}}"#));
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = serde_json::json!({"b": 1, "a": {"d": [{"z": 1, "y": 2}], "c": null}});
        assert_eq!(canonical_json(&value), r#"{"a":{"c":null,"d":[{"y":2,"z":1}]},"b":1}"#);
    }

    #[test]
    fn test_preserve_if_equivalent() {
        let previous = r#"[{"type":"b","target":"x:1"},{"type":"a","target":"x:2"}]"#.to_string();
        let fresh = r#"[{"type":"a","target":"x:2"},{"type":"b","target":"x:1"}]"#.to_string();

        let kept = preserve_if_equivalent("relations", Some(&previous), Some(fresh), relations_equivalent);
        assert_eq!(kept.as_ref(), Some(&previous));

        let changed = r#"[{"type":"a","target":"x:9"}]"#.to_string();
        let kept = preserve_if_equivalent("relations", Some(&previous), Some(changed.clone()), relations_equivalent);
        assert_eq!(kept, Some(changed));

        assert_eq!(preserve_if_equivalent("relations", Some(&previous), None, relations_equivalent), None);
    }

    #[test]
    fn test_carry_forward() {
        let previous = "shp_secret".to_string();
        assert_eq!(carry_forward("raw_key", Some(&previous), None), Some(previous.clone()));
        assert_eq!(
            carry_forward("raw_key", Some(&previous), Some("new".to_string())),
            Some("new".to_string())
        );
        assert_eq!(carry_forward::<String>("raw_key", None, None), None);
    }

    #[test]
    fn test_same_set() {
        let a = vec!["api".to_string(), "core".to_string()];
        let b = vec!["core".to_string(), "api".to_string()];
        assert!(same_set(&a, &b));
        assert!(!same_set(&a, &["api".to_string()]));
    }

    fn relation_list() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec(("[a-c]{1,2}", "[a-z]{1,3}:[0-9]{1,2}"), 0..6)
    }

    fn relations_text(items: &[(String, String)]) -> String {
        let relations: Vec<Relation> = items
            .iter()
            .map(|(kind, target)| Relation {
                kind: kind.clone(),
                target: target.clone(),
                via: String::new(),
            })
            .collect();
        serde_json::to_string(&relations).unwrap()
    }

    fn members_text(items: &[(String, String)]) -> String {
        let members: Vec<Member> = items
            .iter()
            .map(|(user_id, role)| Member {
                user_id: user_id.clone(),
                role: role.clone(),
            })
            .collect();
        serde_json::to_string(&members).unwrap()
    }

    proptest! {
        #[test]
        fn prop_relations_reflexive(items in relation_list()) {
            let text = relations_text(&items);
            prop_assert!(relations_equivalent(&text, &text));
        }

        #[test]
        fn prop_relations_symmetric(a in relation_list(), b in relation_list()) {
            let (a, b) = (relations_text(&a), relations_text(&b));
            prop_assert_eq!(relations_equivalent(&a, &b), relations_equivalent(&b, &a));
        }

        #[test]
        fn prop_relations_shuffle_invariant(
            items in relation_list(),
            other in relation_list(),
            seed in any::<u64>(),
        ) {
            let mut shuffled = items.clone();
            if !shuffled.is_empty() {
                let len = shuffled.len();
                shuffled.rotate_left((seed as usize) % len);
                shuffled.reverse();
            }
            let original = relations_text(&items);
            let reordered = relations_text(&shuffled);
            let other = relations_text(&other);
            prop_assert!(relations_equivalent(&original, &reordered));
            prop_assert_eq!(
                relations_equivalent(&original, &other),
                relations_equivalent(&reordered, &other)
            );
        }

        #[test]
        fn prop_members_symmetric_and_reflexive(
            a in prop::collection::vec(("u[0-9]", "(admin|member|)"), 0..5),
            b in prop::collection::vec(("u[0-9]", "(admin|member|)"), 0..5),
        ) {
            let (a, b) = (members_text(&a), members_text(&b));
            prop_assert!(members_equivalent(&a, &a));
            prop_assert_eq!(members_equivalent(&a, &b), members_equivalent(&b, &a));
        }

        #[test]
        fn prop_links_shuffle_invariant(
            items in prop::collection::vec(("[a-z]{1,4}", "https://[a-z]{1,4}"), 0..5),
        ) {
            let links: Vec<LinkInfo> = items
                .iter()
                .map(|(name, url)| LinkInfo { name: name.clone(), url: url.clone(), icon: String::new() })
                .collect();
            let mut reversed = links.clone();
            reversed.reverse();
            let a = serde_json::to_string(&links).unwrap();
            let b = serde_json::to_string(&reversed).unwrap();
            prop_assert!(links_equivalent(&a, &b));
            prop_assert!(links_equivalent(&b, &a));
        }
    }
}
