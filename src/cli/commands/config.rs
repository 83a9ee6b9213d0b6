use anyhow::Result;
use std::path::PathBuf;

use dramaflow::DramaflowConfig;

pub struct ConfigCommand {
    pub write: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn new(write: Option<PathBuf>) -> Self {
        Self { write }
    }

    pub fn execute(&self, config: &DramaflowConfig) -> Result<()> {
        match &self.write {
            Some(path) => {
                config.save_to_file(path)?;
                println!("💾 Configuration written to {}", path.display());
            }
            None => print!("{}", toml::to_string_pretty(config)?),
        }
        Ok(())
    }
}
