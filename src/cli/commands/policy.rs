use anyhow::{anyhow, Result};
use std::str::FromStr;

use dramaflow::policy::{derive_policy, Role, RolePermissions};
use dramaflow::workflow::PipelineStage;

pub struct PolicyCommand {
    pub stage: String,
    pub role: String,
    pub is_source_language: bool,
}

impl PolicyCommand {
    pub fn new(stage: String, role: String, is_source_language: bool) -> Self {
        Self {
            stage,
            role,
            is_source_language,
        }
    }

    pub fn execute(&self) -> Result<()> {
        let stage = PipelineStage::parse(&self.stage).ok_or_else(|| anyhow!("Unknown stage '{}'", self.stage))?;
        let role = Role::from_str(&self.role).map_err(|e| anyhow!(e))?;
        let permissions = RolePermissions::new(role);

        let policy = derive_policy(stage, role, self.is_source_language, &permissions);
        println!("{}", serde_json::to_string_pretty(&policy)?);
        Ok(())
    }
}
