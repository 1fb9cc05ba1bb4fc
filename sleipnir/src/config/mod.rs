//! Configuration loading for the framework.
//!
//! Configs are [`runa::Config`] structs loaded from `./config/`, with an
//! optional per-robot overlay directory selected through the `ROBOT_NAME`
//! environment variable. Loaded configs are plain bevy resources.
//!
//! # Example
//!
//! ```no_run
//! use bevy::prelude::*;
//! use serde::{Deserialize, Serialize};
//! use sleipnir::prelude::*;
//!
//! #[derive(Resource, Debug, Deserialize, Serialize)]
//! #[serde(deny_unknown_fields)]
//! pub struct MeowConfig {
//!     count: u32,
//! }
//!
//! impl Config for MeowConfig {
//!     const PATH: &'static str = "meow.toml";
//! }
//!
//! let mut app = App::new();
//! app.add_plugins(sleipnir::config::ConfigPlugin::default());
//! app.init_config::<MeowConfig>();
//! ```

use std::{env, path::PathBuf};

use bevy::prelude::*;
use runa::Config;

/// Directory where the main configs are stored
#[derive(Resource, Debug, Clone)]
pub struct MainConfigDir(pub PathBuf);

/// Directory where the per-robot overlay configs are stored
#[derive(Resource, Debug, Clone)]
pub struct OverlayConfigDir(pub PathBuf);

/// Plugin that registers the config directories.
///
/// The overlay directory is only registered when a `ROBOT_NAME` is set, so a
/// bench run on a development machine loads the plain main configs.
pub struct ConfigPlugin {
    main_dir: PathBuf,
}

impl Default for ConfigPlugin {
    fn default() -> Self {
        Self {
            main_dir: PathBuf::from("./config/"),
        }
    }
}

impl ConfigPlugin {
    #[must_use]
    pub fn with_dir(main_dir: impl Into<PathBuf>) -> Self {
        Self {
            main_dir: main_dir.into(),
        }
    }
}

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(MainConfigDir(self.main_dir.clone()));

        if let Ok(robot_name) = env::var("ROBOT_NAME") {
            let overlay = self.main_dir.join("overlay").join(robot_name);
            app.insert_resource(OverlayConfigDir(overlay));
        }
    }
}

/// Trait for adding configs to an [`App`]
pub trait ConfigExt {
    /// Loads the configuration `T` during startup and adds it to the app
    fn init_config<T: Config + Resource>(&mut self) -> &mut Self;
}

impl ConfigExt for App {
    fn init_config<T: Config + Resource>(&mut self) -> &mut Self {
        self.add_systems(PreStartup, load_config::<T>)
    }
}

fn load_config<T: Config + Resource>(
    mut commands: Commands,
    main: Res<MainConfigDir>,
    overlay: Option<Res<OverlayConfigDir>>,
) {
    let overlay = overlay.filter(|dir| dir.0.join(T::PATH).is_file());

    let config = match overlay {
        Some(dir) => T::load_layered(&main.0, &dir.0),
        None => T::load(&main.0),
    };

    match config {
        Ok(config) => commands.insert_resource(config),
        Err(e) => panic!("{:?}", miette::Report::new(e)),
    }
}
