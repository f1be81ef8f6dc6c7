use serde::{Deserialize, Serialize};

use super::schema::{FieldKind, ObjectSchema, VariantSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionBehavior {
    Allow,
    Deny,
    Ask,
}

/// Settings layer a permission update is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionUpdateDestination {
    UserSettings,
    ProjectSettings,
    LocalSettings,
    Session,
    CliArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    AcceptEdits,
    BypassPermissions,
    Default,
    DontAsk,
    Delegate,
    Plan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRuleValue {
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_content: Option<String>,
}

/// Permission change suggested by the host alongside a permission request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PermissionUpdate {
    #[serde(rename_all = "camelCase")]
    AddRules {
        behavior: PermissionBehavior,
        destination: PermissionUpdateDestination,
        rules: Vec<PermissionRuleValue>,
    },
    #[serde(rename_all = "camelCase")]
    ReplaceRules {
        behavior: PermissionBehavior,
        destination: PermissionUpdateDestination,
        rules: Vec<PermissionRuleValue>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveRules {
        behavior: PermissionBehavior,
        destination: PermissionUpdateDestination,
        rules: Vec<PermissionRuleValue>,
    },
    #[serde(rename_all = "camelCase")]
    SetMode {
        destination: PermissionUpdateDestination,
        mode: PermissionMode,
    },
    #[serde(rename_all = "camelCase")]
    AddDirectories {
        destination: PermissionUpdateDestination,
        directories: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveDirectories {
        destination: PermissionUpdateDestination,
        directories: Vec<String>,
    },
}

fn destination_kind() -> FieldKind {
    FieldKind::one_of([
        "userSettings",
        "projectSettings",
        "localSettings",
        "session",
        "cliArg",
    ])
}

fn rules_schema() -> ObjectSchema {
    let rule = ObjectSchema::new()
        .optional("ruleContent", FieldKind::String)
        .field("toolName", FieldKind::String);

    ObjectSchema::new()
        .field("behavior", FieldKind::one_of(["allow", "deny", "ask"]))
        .field("destination", destination_kind())
        .field("rules", FieldKind::array_of(FieldKind::Object(rule)))
}

fn directories_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("destination", destination_kind())
        .field("directories", FieldKind::array_of(FieldKind::String))
}

/// Validation shape matching [`PermissionUpdate`]
pub fn permission_update_kind() -> FieldKind {
    let set_mode = ObjectSchema::new()
        .field("destination", destination_kind())
        .field(
            "mode",
            FieldKind::one_of([
                "acceptEdits",
                "bypassPermissions",
                "default",
                "dontAsk",
                "delegate",
                "plan",
            ]),
        );

    FieldKind::Variant(
        VariantSchema::new("type")
            .variant("addRules", rules_schema())
            .variant("replaceRules", rules_schema())
            .variant("removeRules", rules_schema())
            .variant("setMode", set_mode)
            .variant("addDirectories", directories_schema())
            .variant("removeDirectories", directories_schema()),
    )
}
