use directories::ProjectDirs;
use std::path::PathBuf;

/// Application directories following XDG conventions
#[derive(Debug, Clone)]
pub struct Directories {
    /// Config directory (~/.config/flightdeck)
    pub config: PathBuf,

    /// Config file path
    pub config_file: PathBuf,

    /// Keymap document (the settings store)
    pub keymaps_file: PathBuf,
}

impl Directories {
    /// Create a new `Directories` instance with standard XDG paths.
    ///
    /// Returns `None` if the system's project directories cannot be determined
    /// (no home directory).
    #[must_use]
    pub fn new() -> Option<Self> {
        let project = ProjectDirs::from("", "", "flightdeck")?;
        Some(Self::with_base(project.config_dir().to_path_buf()))
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.json"),
            keymaps_file: base.join("keymaps.json"),
            config: base,
        }
    }

    /// Ensure the config directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_exists(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config)
    }
}
