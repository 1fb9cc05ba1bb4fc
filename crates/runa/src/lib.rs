//! Runa loads the robot's toml configuration files and layers per-robot
//! overlay values on top of the shipped defaults.
//!
//! An overlay may only touch keys that already exist in the base file, and
//! only with values of the same type. Anything else is rejected with the
//! full dotted path of the offending key, so a typo in a robot overlay
//! fails loudly at startup instead of silently leaving a default in place.

use std::{
    fs, mem,
    path::{Path, PathBuf},
};

use miette::Diagnostic;
use serde::de::DeserializeOwned;
use thiserror::Error;
use toml::{Table, Value};

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("cannot read config file `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file `{path}` is not valid toml")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("overlay for `{file}` sets `{key}`, which the base config does not have")]
    UnknownOverlayKey { file: &'static str, key: String },
    #[error("overlay for `{file}` sets `{key}` to a different type than the base value")]
    OverlayTypeMismatch { file: &'static str, key: String },
    #[error("merged config `{file}` does not match the expected schema")]
    Schema {
        file: &'static str,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A configuration struct with a well-known file name.
pub trait Config: DeserializeOwned {
    /// File name of this configuration, relative to the config directory.
    const PATH: &'static str;

    /// Loads the configuration from `dir`.
    fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let base = read_table(&dir.as_ref().join(Self::PATH))?;
        deserialize::<Self>(base)
    }

    /// Loads the configuration from `dir`, with the values found in
    /// `overlay_dir` layered on top.
    fn load_layered(dir: impl AsRef<Path>, overlay_dir: impl AsRef<Path>) -> Result<Self> {
        let mut base = read_table(&dir.as_ref().join(Self::PATH))?;
        let overlay = read_table(&overlay_dir.as_ref().join(Self::PATH))?;

        for (key, value) in overlay_leaves(overlay) {
            apply_leaf(&mut base, &key, value, Self::PATH)?;
        }

        deserialize::<Self>(base)
    }
}

fn read_table(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    text.parse().map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn deserialize<T: Config>(table: Table) -> Result<T> {
    table.try_into().map_err(|source| Error::Schema {
        file: T::PATH,
        source,
    })
}

/// Flattens an overlay into `(dotted.path, value)` leaves.
///
/// Sub-tables are descended into rather than treated as values: an overlay
/// never replaces a whole table, it only retargets the scalars inside it.
fn overlay_leaves(table: Table) -> Vec<(String, Value)> {
    let mut leaves = Vec::new();
    let mut pending: Vec<(String, Table)> = vec![(String::new(), table)];

    while let Some((prefix, table)) = pending.pop() {
        for (key, value) in table {
            let path = if prefix.is_empty() {
                key
            } else {
                format!("{prefix}.{key}")
            };

            match value {
                Value::Table(inner) => pending.push((path, inner)),
                leaf => leaves.push((path, leaf)),
            }
        }
    }

    leaves
}

/// Replaces the base value at `path` with one overlay leaf.
fn apply_leaf(base: &mut Table, path: &str, value: Value, file: &'static str) -> Result<()> {
    let (parents, last) = match path.rsplit_once('.') {
        Some((parents, last)) => (parents, last),
        None => ("", path),
    };

    let mut table = base;
    if !parents.is_empty() {
        for segment in parents.split('.') {
            table = match table.get_mut(segment) {
                Some(Value::Table(inner)) => inner,
                Some(_) => {
                    return Err(Error::OverlayTypeMismatch {
                        file,
                        key: path.to_string(),
                    });
                }
                None => {
                    return Err(Error::UnknownOverlayKey {
                        file,
                        key: path.to_string(),
                    });
                }
            };
        }
    }

    match table.get_mut(last) {
        None => Err(Error::UnknownOverlayKey {
            file,
            key: path.to_string(),
        }),
        Some(Value::Table(_)) => Err(Error::OverlayTypeMismatch {
            file,
            key: path.to_string(),
        }),
        Some(slot) if mem::discriminant(slot) != mem::discriminant(&value) => {
            Err(Error::OverlayTypeMismatch {
                file,
                key: path.to_string(),
            })
        }
        Some(slot) => {
            *slot = value;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct WalkTuning {
        speed: f32,
        limits: Limits,
    }

    #[derive(Debug, Deserialize)]
    struct Limits {
        max_turn: f32,
        clamp: bool,
    }

    impl Config for WalkTuning {
        const PATH: &'static str = "walk_tuning.toml";
    }

    const BASE: &str = "speed = 60.0\n[limits]\nmax_turn = 0.5\nclamp = true";

    fn merged(overlay: &str) -> Result<WalkTuning> {
        let mut base: Table = BASE.parse().unwrap();
        let overlay: Table = overlay.parse().unwrap();

        for (key, value) in overlay_leaves(overlay) {
            apply_leaf(&mut base, &key, value, WalkTuning::PATH)?;
        }

        deserialize(base)
    }

    #[test]
    fn overlay_retargets_nested_scalars() {
        let tuning = merged("[limits]\nmax_turn = 0.8").unwrap();

        assert_eq!(tuning.limits.max_turn, 0.8);
        // keys the overlay does not mention keep their base values
        assert_eq!(tuning.speed, 60.0);
        assert!(tuning.limits.clamp);
    }

    #[test]
    fn top_level_and_nested_overrides_combine() {
        let tuning = merged("speed = 80.0\n[limits]\nclamp = false").unwrap();

        assert_eq!(tuning.speed, 80.0);
        assert!(!tuning.limits.clamp);
    }

    #[test]
    fn unknown_keys_are_reported_with_their_full_path() {
        let err = merged("[limits]\nmax_turm = 0.8").unwrap_err();

        match err {
            Error::UnknownOverlayKey { key, .. } => assert_eq!(key, "limits.max_turm"),
            other => panic!("expected an unknown-key error, got {other:?}"),
        }
    }

    #[test]
    fn changing_a_value_type_is_rejected() {
        let err = merged("speed = \"fast\"").unwrap_err();
        assert!(matches!(err, Error::OverlayTypeMismatch { .. }));
    }

    #[test]
    fn a_leaf_cannot_stand_in_for_a_table() {
        let err = merged("limits = 3").unwrap_err();
        assert!(matches!(err, Error::OverlayTypeMismatch { .. }));
    }
}
