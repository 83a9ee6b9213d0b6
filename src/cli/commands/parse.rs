use anyhow::{anyhow, Result};
use std::collections::HashSet;

use dramaflow::upload::{plan_upload, UploadPlan};

pub struct ParseCommand {
    pub filename: String,
    pub existing: Vec<String>,
}

impl ParseCommand {
    pub fn new(filename: String, existing: Vec<String>) -> Self {
        Self { filename, existing }
    }

    pub fn execute(&self) -> Result<()> {
        let existing = self
            .existing
            .iter()
            .map(|pair| parse_existing(pair))
            .collect::<Result<HashSet<_>>>()?;

        let plan = plan_upload(&self.filename, &existing)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        if let UploadPlan::Overwrite(target) = &plan {
            println!(
                "⚠️  Episode {} already has a {} file; the upload needs overwrite confirmation",
                target.episode, target.language
            );
        }
        Ok(())
    }
}

fn parse_existing(pair: &str) -> Result<(String, u32)> {
    let (language, episode) = pair
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("Expected language:episode, got '{pair}'"))?;
    Ok((language.to_string(), episode.parse()?))
}
