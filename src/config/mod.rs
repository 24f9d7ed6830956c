use crate::errors::{AppError, AppResult};
use crate::models::session::SessionRules;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_duration")]
    pub duration_secs: u32,
    #[serde(default = "default_presence_interval")]
    pub presence_interval_secs: u32,
    #[serde(default = "default_max_misses")]
    pub max_misses: u32,
    #[serde(default = "default_boost_cost")]
    pub boost_cost: i64,
    #[serde(default = "default_base_reward")]
    pub base_reward: i64,
    /// Tokens granted on the first successful sign-in
    #[serde(default = "default_initial_grant")]
    pub initial_grant: i64,
    /// Tokens credited per 1 unit of external currency
    #[serde(default = "default_conversion_rate")]
    pub conversion_rate: i64,
    #[serde(default = "default_recipient")]
    pub payment_recipient: String,
    /// Make the simulated host bridge cancel every command
    #[serde(default)]
    pub dev_cancel: bool,
}

fn default_duration() -> u32 {
    600
}
fn default_presence_interval() -> u32 {
    70
}
fn default_max_misses() -> u32 {
    2
}
fn default_boost_cost() -> i64 {
    5
}
fn default_base_reward() -> i64 {
    10
}
fn default_initial_grant() -> i64 {
    25
}
fn default_conversion_rate() -> i64 {
    10
}
fn default_recipient() -> String {
    "0x0000000000000000000000000000000000c1rc1e".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db_path: PathBuf) -> Self {
        Self {
            database: db_path.to_string_lossy().to_string(),
            duration_secs: default_duration(),
            presence_interval_secs: default_presence_interval(),
            max_misses: default_max_misses(),
            boost_cost: default_boost_cost(),
            base_reward: default_base_reward(),
            initial_grant: default_initial_grant(),
            conversion_rate: default_conversion_rate(),
            payment_recipient: default_recipient(),
            dev_cancel: false,
        }
    }

    /// Return the standard configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rpresence")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rpresence.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rpresence.sqlite")
    }

    /// Session rules derived from this configuration
    pub fn rules(&self) -> SessionRules {
        SessionRules {
            duration_secs: self.duration_secs,
            presence_interval_secs: self.presence_interval_secs,
            max_misses: self.max_misses,
            boost_cost: self.boost_cost,
            base_reward: self.base_reward,
        }
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            let cfg: Config = serde_yaml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
            cfg.validate()?;
            Ok(cfg)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.duration_secs == 0 {
            return Err(AppError::Config("duration_secs must be positive".into()));
        }
        if self.presence_interval_secs == 0 {
            return Err(AppError::Config(
                "presence_interval_secs must be positive".into(),
            ));
        }
        if self.max_misses == 0 {
            return Err(AppError::Config("max_misses must be at least 1".into()));
        }
        if self.boost_cost < 0 || self.base_reward < 0 || self.conversion_rate < 0 {
            return Err(AppError::Config(
                "costs, rewards and rates cannot be negative".into(),
            ));
        }
        Ok(())
    }

    /// Initialize configuration and database files.
    /// Returns the database path that was set up.
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> io::Result<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_name {
            Some(name) => {
                let p = std::path::Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => dir.join("rpresence.sqlite"),
        };

        let config = Self::with_database(db_path.clone());

        if !is_test {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(db_path)
    }
}
