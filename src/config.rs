use std::path::Path;

use ini::Ini;

use crate::error::{Error, IoResultExt, Result};

/// repository configuration stored in `.git/config`
///
/// only `core.repositoryformatversion`, `core.filemode`, and `core.bare`
/// are consulted; unknown sections/keys are preserved verbatim on save.
#[derive(Clone, Debug)]
pub struct Config {
    raw: Ini,
}

impl Config {
    /// construct the config written by `init`: version 0, non-bare, filemode off
    pub fn default_for_init() -> Self {
        let mut raw = Ini::new();
        raw.with_section(Some("core"))
            .set("repositoryformatversion", "0")
            .set("filemode", "false")
            .set("bare", "false");
        Self { raw }
    }

    /// load config from `.git/config`
    pub fn load(path: &Path) -> Result<Self> {
        let raw = Ini::load_from_file(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self { raw };
        config.check_format_version()?;
        Ok(config)
    }

    /// write config to `.git/config`
    pub fn save(&self, path: &Path) -> Result<()> {
        self.raw.write_to_file(path).with_path(path)
    }

    fn check_format_version(&self) -> Result<()> {
        let version = self
            .raw
            .section(Some("core"))
            .and_then(|s| s.get("repositoryformatversion"))
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        if version != 0 {
            return Err(Error::UnsupportedFormat(version));
        }
        Ok(())
    }

    /// `core.filemode` value
    pub fn filemode(&self) -> bool {
        self.raw
            .section(Some("core"))
            .and_then(|s| s.get("filemode"))
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    /// `core.bare` value
    pub fn bare(&self) -> bool {
        self.raw
            .section(Some("core"))
            .and_then(|s| s.get("bare"))
            .map(|v| v == "true")
            .unwrap_or(false)
    }
}
