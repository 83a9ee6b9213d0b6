use std::collections::HashSet;

use super::roles::Role;
use super::traits::PermissionProvider;
use crate::workflow::PipelineStage;

/// Permission provider backed by the role table alone.
///
/// Variant access can be narrowed to a set of languages; by default every
/// variant is accessible.
#[derive(Debug, Clone)]
pub struct RolePermissions {
    role: Role,
    languages: Option<HashSet<String>>,
}

impl RolePermissions {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            languages: None,
        }
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }
}

impl PermissionProvider for RolePermissions {
    fn role(&self) -> Role {
        self.role
    }

    fn has_button(&self, action: &str) -> bool {
        self.role.default_buttons().contains(&action)
    }

    fn has_workflow(&self, stage_id: &str) -> bool {
        PipelineStage::parse(stage_id)
            .map(|stage| self.role.sees_stage(stage))
            .unwrap_or(false)
    }

    fn can_access_variant(&self, _project_id: &str, language: &str) -> bool {
        if self.role.is_manager() {
            return true;
        }
        match &self.languages {
            Some(languages) => languages.contains(language),
            None => true,
        }
    }
}
