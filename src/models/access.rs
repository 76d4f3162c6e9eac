//! RBAC resource records
//!
//! Service accounts, roles, cluster roles and the bindings that connect them.

use super::nullable;
use serde::{Deserialize, Serialize};

/// A ServiceAccount
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccountRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    /// `default` accounts and accounts with a hidden system prefix
    #[serde(default)]
    pub is_system: bool,
}

/// A single policy rule of a Role or ClusterRole
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    #[serde(default, alias = "apiGroups", deserialize_with = "nullable")]
    pub api_groups: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub resources: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub verbs: Vec<String>,
}

/// A namespaced Role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub rules: Vec<PolicyRule>,
}

/// A cluster-scoped ClusterRole
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRoleRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub rules: Vec<PolicyRule>,
}

/// Kind of role a binding grants.
///
/// Anything other than `ClusterRole` resolves to a namespaced Role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleRefKind {
    ClusterRole,
    #[default]
    #[serde(other)]
    Role,
}

/// Reference from a binding to the role it grants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleRef {
    #[serde(default)]
    pub kind: RoleRefKind,
    pub name: String,
    #[serde(
        default,
        alias = "apiGroup",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_group: Option<String>,
}

/// Kind of a binding subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    ServiceAccount,
    User,
    Group,
    #[serde(other)]
    Unknown,
}

/// A subject the binding grants the role to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub kind: SubjectKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Subject {
    /// Explicit namespace of the subject, treating an empty string as unset
    pub fn explicit_namespace(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|ns| !ns.is_empty())
    }

    pub fn is_service_account(&self) -> bool {
        self.kind == SubjectKind::ServiceAccount
    }
}

/// A namespaced RoleBinding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleBindingRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(alias = "roleRef")]
    pub role_ref: RoleRef,
    #[serde(default, deserialize_with = "nullable")]
    pub subjects: Vec<Subject>,
}

/// A cluster-scoped ClusterRoleBinding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRoleBindingRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(alias = "roleRef")]
    pub role_ref: RoleRef,
    #[serde(default, deserialize_with = "nullable")]
    pub subjects: Vec<Subject>,
}

/// Everything the access graph is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessInput {
    #[serde(default, alias = "service_accounts", deserialize_with = "nullable")]
    pub service_accounts: Vec<ServiceAccountRecord>,
    #[serde(default, deserialize_with = "nullable")]
    pub roles: Vec<RoleRecord>,
    #[serde(default, alias = "cluster_roles", deserialize_with = "nullable")]
    pub cluster_roles: Vec<ClusterRoleRecord>,
    #[serde(default, alias = "role_bindings", deserialize_with = "nullable")]
    pub role_bindings: Vec<RoleBindingRecord>,
    #[serde(
        default,
        alias = "cluster_role_bindings",
        deserialize_with = "nullable"
    )]
    pub cluster_role_bindings: Vec<ClusterRoleBindingRecord>,
}

impl AccessInput {
    pub fn is_empty(&self) -> bool {
        self.service_accounts.is_empty()
            && self.roles.is_empty()
            && self.cluster_roles.is_empty()
            && self.role_bindings.is_empty()
            && self.cluster_role_bindings.is_empty()
    }
}
