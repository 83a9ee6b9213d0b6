// Permission provider interface - the workflow core only asks, never enforces

use super::roles::Role;

/// Answers permission questions about the acting user
pub trait PermissionProvider {
    /// Role of the acting user
    fn role(&self) -> Role;

    /// Whether a named action button is available
    fn has_button(&self, action: &str) -> bool;

    /// Whether a pipeline stage is visible, by stage identifier
    fn has_workflow(&self, stage_id: &str) -> bool;

    /// Whether the user may open the given language variant of a project
    fn can_access_variant(&self, project_id: &str, language: &str) -> bool;
}

impl<P: PermissionProvider + ?Sized> PermissionProvider for &P {
    fn role(&self) -> Role {
        (**self).role()
    }

    fn has_button(&self, action: &str) -> bool {
        (**self).has_button(action)
    }

    fn has_workflow(&self, stage_id: &str) -> bool {
        (**self).has_workflow(stage_id)
    }

    fn can_access_variant(&self, project_id: &str, language: &str) -> bool {
        (**self).can_access_variant(project_id, language)
    }
}
