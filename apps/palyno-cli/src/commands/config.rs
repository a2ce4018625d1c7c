use std::path::PathBuf;

use anyhow::Context;
use palyno_lab::LabConfig;
use tracing::info;

use crate::cli::ConfigArgs;

/// Renders the effective configuration, saving it first when asked.
pub fn handle(args: &ConfigArgs, config: &LabConfig, path: Option<PathBuf>) -> anyhow::Result<String> {
    if args.save {
        let written = config.save(path).context("failed to save configuration")?;
        info!(path = %written.display(), "Configuration written");
    }

    config.to_toml().context("failed to render configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_without_saving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palyno.toml");

        let out = handle(&ConfigArgs { save: false }, &LabConfig::default(), Some(path.clone())).unwrap();
        assert!(out.contains("min_total_grains = 100"));
        assert!(!path.exists());
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palyno.toml");

        let out = handle(&ConfigArgs { save: true }, &LabConfig::default(), Some(path.clone())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), out);
    }
}
