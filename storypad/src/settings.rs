//! User preferences, saved and loaded as TOML.

use std::num::NonZeroUsize;

use storypad_core::{
    canvas::{brush::BrushError, Brush},
    drawing::DrawingConfig,
    history,
    story::AgeGroup,
    Color,
};

const DOCUMENTATION: &str = r##"# Storypad preferences. You may edit this file, but be aware that formatting and comments will not
# be preserved. Missing keys take their default values.

# Colors are written "#RRGGBB" or "#RRGGBBAA".
# [history] capacity is the number of canvas states kept for undo. Each costs width * height * 4 bytes!
# [story] age_group is one of "5-7", "8-10", "11-13".

"##;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CanvasPreferences {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}
impl Default for CanvasPreferences {
    fn default() -> Self {
        let config = DrawingConfig::default();
        Self {
            width: config.width,
            height: config.height,
            background: config.background,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BrushPreferences {
    pub color: Color,
    pub size: f32,
}
impl Default for BrushPreferences {
    fn default() -> Self {
        let brush = Brush::default();
        Self {
            color: brush.color(),
            size: brush.size(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HistoryPreferences {
    pub capacity: NonZeroUsize,
}
impl Default for HistoryPreferences {
    fn default() -> Self {
        Self {
            capacity: history::DEFAULT_CAPACITY,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StoryPreferences {
    pub age_group: AgeGroup,
    pub language: String,
}
impl Default for StoryPreferences {
    fn default() -> Self {
        Self {
            age_group: AgeGroup::default(),
            language: "en".to_owned(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Preferences {
    pub canvas: CanvasPreferences,
    pub brush: BrushPreferences,
    pub history: HistoryPreferences,
    pub story: StoryPreferences,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LoadState {
    Loaded,
    /// No file exists yet.
    Missing,
    /// A file exists but couldn't be read or parsed. It should not be overwritten.
    Failed,
}

impl Preferences {
    const FILENAME: &'static str = "preferences.toml";
    /// Path of the preferences in the user's preference directory.
    #[must_use]
    pub fn default_path() -> Option<std::path::PathBuf> {
        let mut dir = preferences_dir()?;
        dir.push(Self::FILENAME);
        Some(dir)
    }
    /// Load from `path`, or defaults if that fails for any reason.
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> (Self, LoadState) {
        if !path.exists() {
            log::info!("No preferences at {path:?}, defaulting.");
            return (Self::default(), LoadState::Missing);
        }
        let preferences: anyhow::Result<Self> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let preferences: Self = toml::from_str(&string)?;
            preferences.drawing_config()?;

            Ok(preferences)
        };
        match preferences {
            Ok(preferences) => (preferences, LoadState::Loaded),
            Err(e) => {
                log::warn!("Failed to load preferences from {path:?}, defaulting:\n{e:#}");
                (Self::default(), LoadState::Failed)
            }
        }
    }
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            // Explicity do *not* create recursively. If not found, the user probably has a good reason.
            // Ignore errors (could already exist). Any real errors will be emitted by file access below.
            let _ = std::fs::DirBuilder::new().create(parent);
        }
        let mut string = toml::ser::to_string_pretty(self)?;
        // Prefix some documentation.
        string = DOCUMENTATION.to_owned() + &string;
        std::fs::write(path, string)?;
        Ok(())
    }
    /// Settings for a new drawing session. Fails if the brush settings are unusable.
    pub fn drawing_config(&self) -> Result<DrawingConfig, BrushError> {
        Ok(DrawingConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            background: self.canvas.background,
            brush: Brush::new(self.brush.color, self.brush.size)?,
            history_capacity: self.history.capacity,
        })
    }
}
