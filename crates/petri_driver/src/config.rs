//! # Simulation Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an
//! empty file is a valid config.
//!
//! ```toml
//! display_width = 320
//! display_height = 240
//! scale = 3
//! max_generations = 50
//! pacing_ms = 100
//! idle_poll_ms = 100
//! topology = "toroidal"
//! palette = "bordered"
//!
//! [population]
//! kind = "random"
//! seed = 42
//! density = 0.33
//! ```

use std::path::Path;
use std::time::Duration;

use petri_core::{find_pattern, Palette, PaletteStyle, Population, Topology};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest display accepted, in pixels. Frames are allocated at this size.
pub const MAX_DISPLAY_PIXELS: u64 = 1 << 26;

/// Driver configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Display width in pixels.
    pub display_width: u32,
    /// Display height in pixels.
    pub display_height: u32,
    /// Pixels per cell along each axis.
    pub scale: u32,
    /// Generation budget of one run.
    pub max_generations: u64,
    /// Sleep between generations, in milliseconds.
    pub pacing_ms: u64,
    /// Sleep between idle polls of the control queue, in milliseconds.
    pub idle_poll_ms: u64,
    /// Edge policy of every grid.
    pub topology: Topology,
    /// Block layout of rendered frames.
    pub palette: PaletteStyle,
    /// Generation-0 policy.
    pub population: Population,
    /// Name the signal handler is registered under.
    pub command_name: String,
    /// Image name frames are uploaded under.
    pub image_name: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            display_width: 320,
            display_height: 240,
            scale: 3,
            max_generations: 50,
            pacing_ms: 100,
            idle_poll_ms: 100,
            topology: Topology::default(),
            palette: PaletteStyle::default(),
            population: Population::default(),
            command_name: "controlchannel".to_string(),
            image_name: ".limage".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that a run can be built from this config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale == 0 {
            return Err(ConfigError::Invalid("scale must be at least 1".into()));
        }
        let (w, h) = self.grid_size();
        if w == 0 || h == 0 {
            return Err(ConfigError::Invalid(format!(
                "display {}x{} is smaller than one {}px cell",
                self.display_width, self.display_height, self.scale
            )));
        }
        let pixels = u64::from(self.display_width) * u64::from(self.display_height);
        if pixels > MAX_DISPLAY_PIXELS {
            return Err(ConfigError::Invalid(format!(
                "display {}x{} exceeds {MAX_DISPLAY_PIXELS} pixels",
                self.display_width, self.display_height
            )));
        }
        if self.idle_poll_ms == 0 {
            return Err(ConfigError::Invalid("idle_poll_ms must be positive".into()));
        }
        if self.command_name.is_empty() || self.image_name.is_empty() {
            return Err(ConfigError::Invalid("command_name and image_name must be set".into()));
        }
        match &self.population {
            Population::Random { density, .. } if !(0.0..=1.0).contains(density) => {
                return Err(ConfigError::Invalid(format!(
                    "population density {density} outside [0, 1]"
                )));
            }
            Population::Pattern { name } if find_pattern(name).is_none() => {
                return Err(ConfigError::Invalid(format!("unknown pattern: {name}")));
            }
            _ => {}
        }
        Ok(())
    }

    /// Grid dimensions in cells: the display divided by the scale.
    #[must_use]
    pub fn grid_size(&self) -> (usize, usize) {
        let scale = self.scale.max(1);
        (
            (self.display_width / scale) as usize,
            (self.display_height / scale) as usize,
        )
    }

    /// Sleep between generations.
    #[must_use]
    pub const fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Sleep between idle polls.
    #[must_use]
    pub const fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    /// Renderer palette for the configured style.
    #[must_use]
    pub const fn render_palette(&self) -> Palette {
        Palette::from_style(self.palette)
    }

    /// Sets display size.
    #[must_use]
    pub const fn with_display(mut self, width: u32, height: u32) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    /// Sets pixels per cell.
    #[must_use]
    pub const fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the generation budget.
    #[must_use]
    pub const fn with_max_generations(mut self, generations: u64) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the pacing interval.
    #[must_use]
    pub const fn with_pacing_ms(mut self, ms: u64) -> Self {
        self.pacing_ms = ms;
        self
    }

    /// Sets the idle poll interval.
    #[must_use]
    pub const fn with_idle_poll_ms(mut self, ms: u64) -> Self {
        self.idle_poll_ms = ms;
        self
    }

    /// Sets the edge policy.
    #[must_use]
    pub const fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Sets the generation-0 policy.
    #[must_use]
    pub fn with_population(mut self, population: Population) -> Self {
        self.population = population;
        self
    }
}
