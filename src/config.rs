use {
	crate::{Error, Result},
	const_format::concatcp,
	serde::Deserialize,
	std::{
		fs, io,
		path::{Path, PathBuf},
		str::FromStr,
	},
	tracing::Level,
};

pub const DEFAULT_CONFIG_PATH: &str = concatcp!(env!("CARGO_PKG_NAME"), ".toml");
pub const DEFAULT_DATABASE_PATH: &str = concatcp!(env!("CARGO_PKG_NAME"), ".db");

/// Contents of the TOML configuration file; every key is optional.
///
/// ```toml
/// [database]
/// path = "maps.db"
///
/// [log]
/// level = "debug"
/// ```
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub database: DatabaseConfig,
	pub log: LogConfig,
}

#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
	pub path: PathBuf,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self { path: DEFAULT_DATABASE_PATH.into() }
	}
}

#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
	pub level: String,
}

impl Default for LogConfig {
	fn default() -> Self {
		Self { level: "info".into() }
	}
}

impl FromStr for Config {
	type Err = Error;
	fn from_str(s: &str) -> Result<Self> {
		Ok(toml::from_str(s)?)
	}
}

impl Config {
	/// An explicit path must exist; the default path may be absent.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let (path, required) = match path {
			Some(path) => (path, true),
			None => (Path::new(DEFAULT_CONFIG_PATH), false),
		};
		match fs::read_to_string(path) {
			Ok(text) => text.parse(),
			Err(err) if !required && err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
			Err(err) => Err(Error::Config(format!("{:?}: {err}", path.display().to_string()))),
		}
	}
}

impl LogConfig {
	pub fn maxLevel(&self) -> Result<Level> {
		Level::from_str(&self.level).map_err(|err| Error::Config(format!("log.level {:?}: {err}", self.level)))
	}
}

/// Installs the global stderr subscriber.
pub fn initLogging(config: &LogConfig) -> Result<()> {
	tracing_subscriber::fmt()
		.with_max_level(config.maxLevel()?)
		.with_writer(io::stderr)
		.try_init()
		.map_err(|err| Error::Config(err.to_string()))
}
