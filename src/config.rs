use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use home::home_dir;
use serde::{Deserialize, Serialize};

use smf_notes::{DecodeOptions, SmfError};

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    decode: DecodeOptions,
}

impl Config {
    // folder placed in $HOME directory
    const FOLDER: &'static str = ".smf-notes";

    pub const fn decode_options(&self) -> &DecodeOptions {
        &self.decode
    }

    pub fn decode_options_mut(&mut self) -> &mut DecodeOptions {
        &mut self.decode
    }

    fn get_default_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(Self::FOLDER).join("config.json"))
    }

    /// Read the config at `path`, or the one in the home folder.
    ///
    /// A missing home config falls back to the defaults, a missing explicit config is an error.
    pub fn read_config(path: Option<&Path>) -> Result<Self, SmfError> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(SmfError::ConfigError(format!(
                        "Config file not found {path:?}"
                    )));
                }
                path.to_path_buf()
            }
            None => match Self::get_default_path() {
                Some(default_path) if default_path.exists() => default_path,
                _ => return Ok(Self::default()),
            },
        };
        log::debug!("Reading configuration {config_path:?}");
        let file = File::open(config_path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_json::from_reader(reader).map_err(|err| {
            SmfError::ConfigError(format!("Could not read local configuration {err:}"))
        })?;
        Ok(config)
    }
}
