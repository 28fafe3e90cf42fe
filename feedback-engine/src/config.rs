// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the feedback engine.
//!
//! Configuration is layered: the embedded [`FeedbackConfig::DEFAULT_CONFIG`] is read first, then an
//! optional user-provided TOML file is merged on top of it.

use crate::errors::ConfigParseError;
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Which categories of feedback are added to the list.
///
/// Removals are applied regardless of these settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityConfig {
    /// Show build errors.
    pub show_errors: bool,

    /// Show build warnings.
    pub show_warnings: bool,

    /// Show failing tests.
    pub show_failing_tests: bool,

    /// Show ignored tests.
    pub show_ignored_tests: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            show_errors: true,
            show_warnings: true,
            show_failing_tests: true,
            show_ignored_tests: true,
        }
    }
}

/// Resolved configuration for the feedback engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackConfig {
    /// Which categories are shown.
    pub visibility: VisibilityConfig,

    /// Show detailed run information.
    pub show_run_information: bool,

    /// Allow "go to source" to fall back to navigating to a type.
    pub can_go_to_types: bool,

    /// The picture shown next to progress information.
    pub progress_picture: Utf8PathBuf,
}

impl FeedbackConfig {
    /// The default configuration, embedded in the binary.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the configuration, merging `config_file` (if any) over the defaults.
    ///
    /// Unknown keys produce a warning rather than an error.
    pub fn from_sources(config_file: Option<&Utf8Path>) -> Result<Self, ConfigParseError> {
        Self::from_sources_impl(config_file, |config_file, unknown| {
            let mut unknown_str = String::new();
            if unknown.len() == 1 {
                // Print this on the same line.
                unknown_str.push(' ');
                unknown_str.extend(unknown.iter().map(|s| s.as_str()));
            } else {
                for ignored_key in unknown {
                    unknown_str.push('\n');
                    unknown_str.push_str("  - ");
                    unknown_str.push_str(ignored_key);
                }
            }

            warn!("ignoring unknown configuration keys in config file {config_file}:{unknown_str}")
        })
    }

    /// Returns the default configuration.
    pub fn default_config() -> Self {
        Self::from_sources_impl(None, |_, _| {})
            .expect("the embedded default config is always valid")
    }

    // A custom unknown_callback can be passed in while testing.
    fn from_sources_impl(
        config_file: Option<&Utf8Path>,
        mut unknown_callback: impl FnMut(&Utf8Path, &BTreeSet<String>),
    ) -> Result<Self, ConfigParseError> {
        let mut builder = Self::make_default_config();
        let config_path = match config_file {
            Some(file) => {
                builder = builder.add_source(File::new(file.as_str(), FileFormat::Toml));
                file.to_owned()
            }
            None => Utf8PathBuf::from("<default config>"),
        };

        let config = builder
            .build()
            .map_err(|err| ConfigParseError::new(config_path.clone(), err))?;

        let mut unknown = BTreeSet::new();
        let deserialized: DeserializedConfig =
            serde_ignored::deserialize(config, |path: serde_ignored::Path| {
                unknown.insert(path.to_string());
            })
            .map_err(|err| ConfigParseError::new(config_path.clone(), err))?;

        if !unknown.is_empty() {
            unknown_callback(&config_path, &unknown);
        }

        Ok(deserialized.into_config())
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedConfig {
    ui: DeserializedUiConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedUiConfig {
    show_errors: bool,
    show_warnings: bool,
    show_failing_tests: bool,
    show_ignored_tests: bool,
    show_run_information: bool,
    can_go_to_types: bool,
    progress_picture: Utf8PathBuf,
}

impl DeserializedConfig {
    fn into_config(self) -> FeedbackConfig {
        let DeserializedUiConfig {
            show_errors,
            show_warnings,
            show_failing_tests,
            show_ignored_tests,
            show_run_information,
            can_go_to_types,
            progress_picture,
        } = self.ui;

        FeedbackConfig {
            visibility: VisibilityConfig {
                show_errors,
                show_warnings,
                show_failing_tests,
                show_ignored_tests,
            },
            show_run_information,
            can_go_to_types,
            progress_picture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use maplit::btreeset;
    use pretty_assertions::assert_eq;

    fn write_config(dir: &Utf8TempDir, contents: &str) -> Utf8PathBuf {
        let path = dir.path().join("feedback.toml");
        std::fs::write(&path, contents).expect("wrote config file");
        path
    }

    #[test]
    fn test_default_config() {
        let config = FeedbackConfig::default_config();
        assert_eq!(
            config,
            FeedbackConfig {
                visibility: VisibilityConfig::default(),
                show_run_information: true,
                can_go_to_types: false,
                progress_picture: "progress.gif".into(),
            }
        );
    }

    #[test]
    fn test_user_config_overrides_defaults() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let path = write_config(
            &dir,
            indoc! {r#"
                [ui]
                show-warnings = false
                can-go-to-types = true
                progress-picture = "spinner.png"
            "#},
        );

        let mut unknown_keys = Vec::new();
        let config = FeedbackConfig::from_sources_impl(Some(path.as_path()), |_, unknown| {
            unknown_keys.push(unknown.clone());
        })
        .expect("config is valid");

        assert!(unknown_keys.is_empty(), "no unknown keys: {unknown_keys:?}");
        assert!(!config.visibility.show_warnings);
        assert!(config.visibility.show_errors);
        assert!(config.can_go_to_types);
        assert_eq!(config.progress_picture.as_str(), "spinner.png");
    }

    #[test]
    fn test_unknown_keys_reported() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let path = write_config(
            &dir,
            indoc! {r#"
                [ui]
                show-errors = false
                show-everything = true

                [storage]
                dir = "target"
            "#},
        );

        let mut unknown_keys = Vec::new();
        let config = FeedbackConfig::from_sources_impl(Some(path.as_path()), |file, unknown| {
            unknown_keys.push((file.to_owned(), unknown.clone()));
        })
        .expect("unknown keys are not an error");

        assert!(!config.visibility.show_errors);
        assert_eq!(
            unknown_keys,
            vec![(
                path.clone(),
                btreeset! {"storage".to_owned(), "ui.show-everything".to_owned()}
            )]
        );
    }

    #[test]
    fn test_invalid_value() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let path = write_config(&dir, "[ui]\nshow-errors = \"sometimes\"\n");

        let err = FeedbackConfig::from_sources(Some(path.as_path())).expect_err("invalid bool");
        assert_eq!(err.config_file(), &path);
    }

    #[test]
    fn test_missing_file() {
        let err = FeedbackConfig::from_sources(Some(Utf8Path::new("does/not/exist.toml")))
            .expect_err("missing file is an error");
        assert_eq!(err.config_file().as_str(), "does/not/exist.toml");
    }
}
