// Editor policy - derived read-only / visibility flags for the editor surface
//
// The permission provider is injected; this module only asks it questions.

pub mod editor;
pub mod permissions;
pub mod roles;
pub mod steps;
pub mod traits;

#[cfg(test)]
pub mod mocks;

pub use editor::{derive_policy, episode_work_status, policy_for_variant, EditorPolicy, EpisodeWorkStatus};
pub use permissions::RolePermissions;
pub use roles::Role;
pub use steps::{pipeline_steps, StepState, StepView};
pub use traits::PermissionProvider;
