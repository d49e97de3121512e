//! Serde types for the ZeroTier Central member API.
//!
//! Only the fields ztbot reads or patches are modeled. Unknown fields are
//! ignored on decode; optional fields tolerate `null` via `Option`.

use serde::{Deserialize, Serialize};

/// Editable `config` portion of a member record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberConfig {
    #[serde(default)]
    pub authorized: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_assignments: Vec<String>,
}

/// Partial update POSTed to the per-node member endpoint.
///
/// Fields left `None` are omitted from the body so the remote service
/// keeps its current values; `hidden` and `config.authorized` are always
/// sent.
#[derive(Debug, Clone, Serialize)]
pub struct MemberPatch {
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub config: MemberConfig,
}

/// A member record as returned by the list endpoint.
///
/// Owned by the remote service; never cached across calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub node_id: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub physical_address: Option<String>,
    #[serde(default)]
    pub client_version: Option<String>,
    #[serde(default)]
    pub config: MemberConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_decodes_with_missing_and_null_fields() {
        let m: Member = serde_json::from_str(
            r#"{"nodeId": "deadbeef00", "physicalAddress": null, "config": {}}"#,
        )
        .unwrap();
        assert_eq!(m.node_id, "deadbeef00");
        assert!(m.physical_address.is_none());
        assert!(!m.config.authorized);
        assert!(m.config.ip_assignments.is_empty());
    }

    #[test]
    fn member_decodes_full_record() {
        let m: Member = serde_json::from_str(
            r#"{
                "nodeId": "deadbeef00",
                "hidden": false,
                "name": "laptop",
                "description": "added by via telegram bot by 42",
                "online": true,
                "physicalAddress": "198.51.100.7",
                "clientVersion": "1.12.2",
                "config": {"authorized": true, "ipAssignments": ["10.0.0.5"]}
            }"#,
        )
        .unwrap();
        assert_eq!(m.name.as_deref(), Some("laptop"));
        assert!(m.online);
        assert_eq!(m.config.ip_assignments, vec!["10.0.0.5"]);
    }

    #[test]
    fn patch_omits_unset_metadata() {
        let patch = MemberPatch {
            hidden: false,
            name: None,
            description: None,
            config: MemberConfig {
                authorized: false,
                ip_assignments: Vec::new(),
            },
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"hidden": false, "config": {"authorized": false}})
        );
    }

    #[test]
    fn patch_serializes_name_and_description() {
        let patch = MemberPatch {
            hidden: false,
            name: Some("laptop".into()),
            description: Some("desc".into()),
            config: MemberConfig {
                authorized: true,
                ip_assignments: Vec::new(),
            },
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["name"], "laptop");
        assert_eq!(json["config"]["authorized"], true);
    }
}
