use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};
use tracing::warn;

pub const RATE_FILE: &str = "unodc_sexual_violence_rate_per100k.csv";
pub const CLEAN_FILE: &str = "unodc_sexual_violence_clean.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub rate_path: PathBuf,
    pub clean_path: PathBuf,
    pub static_dir: PathBuf,
    /// Passed through to the index page for client-side API calls.
    pub api_base: String,
}

/// Keys accepted in the optional YAML file. All optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<IpAddr>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    rate_path: Option<PathBuf>,
    clean_path: Option<PathBuf>,
    static_dir: Option<PathBuf>,
    api_base: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_data_dir(Path::new("./data"))
    }
}

impl Config {
    fn with_data_dir(data_dir: &Path) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5001,
            rate_path: data_dir.join(RATE_FILE),
            clean_path: data_dir.join(CLEAN_FILE),
            static_dir: PathBuf::from("./static"),
            api_base: "http://localhost:5001".to_string(),
        }
    }

    /// Defaults, then the YAML file named by `CONFIG_FILE`, then environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| env::var(key).ok())
    }

    fn resolve(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file = match var("CONFIG_FILE") {
            Some(path) => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                serde_yaml::from_str::<FileConfig>(&raw)
                    .with_context(|| format!("parsing config file {}", path))?
            }
            None => FileConfig::default(),
        };

        let data_dir = var("DATA_DIR")
            .map(PathBuf::from)
            .or(file.data_dir)
            .unwrap_or_else(|| PathBuf::from("./data"));
        let mut cfg = Self::with_data_dir(&data_dir);

        if let Some(host) = file.host {
            cfg.host = host;
        }
        if let Some(port) = file.port {
            cfg.port = port;
        }
        cfg.rate_path = file.rate_path.unwrap_or(cfg.rate_path);
        cfg.clean_path = file.clean_path.unwrap_or(cfg.clean_path);
        cfg.static_dir = file.static_dir.unwrap_or(cfg.static_dir);
        cfg.api_base = file.api_base.unwrap_or(cfg.api_base);

        if let Some(raw) = var("HOST") {
            match raw.parse() {
                Ok(host) => cfg.host = host,
                Err(_) => warn!(host = %raw, "ignoring unparsable HOST"),
            }
        }
        if let Some(raw) = var("PORT") {
            match raw.parse() {
                Ok(port) => cfg.port = port,
                Err(_) => warn!(port = %raw, "ignoring unparsable PORT"),
            }
        }
        if let Some(p) = var("RATE_PATH") {
            cfg.rate_path = p.into();
        }
        if let Some(p) = var("CLEAN_PATH") {
            cfg.clean_path = p.into();
        }
        if let Some(p) = var("STATIC_DIR") {
            cfg.static_dir = p.into();
        }
        if let Some(v) = var("API_BASE") {
            cfg.api_base = v;
        }
        Ok(cfg)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::resolve(vars(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.addr().to_string(), "0.0.0.0:5001");
        assert_eq!(cfg.rate_path, Path::new("./data").join(RATE_FILE));
        assert_eq!(cfg.api_base, "http://localhost:5001");
    }

    #[test]
    fn test_env_overrides_and_bad_port() {
        let cfg = Config::resolve(vars(&[
            ("DATA_DIR", "/srv/data"),
            ("PORT", "not-a-port"),
            ("API_BASE", "https://stats.example.org"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 5001);
        assert_eq!(cfg.clean_path, Path::new("/srv/data").join(CLEAN_FILE));
        assert_eq!(cfg.api_base, "https://stats.example.org");
    }

    #[test]
    fn test_file_then_env() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "port: 8080\nrate_path: /tmp/rates.csv\napi_base: http://file")?;
        let path = f.path().to_string_lossy().to_string();

        let cfg = Config::resolve(vars(&[("CONFIG_FILE", path.as_str()), ("API_BASE", "http://env")]))?;
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.rate_path, PathBuf::from("/tmp/rates.csv"));
        assert_eq!(cfg.api_base, "http://env");
        Ok(())
    }

    #[test]
    fn test_bad_file_is_fatal() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "prot: 8080")?;
        let path = f.path().to_string_lossy().to_string();
        assert!(Config::resolve(vars(&[("CONFIG_FILE", path.as_str())])).is_err());
        assert!(Config::resolve(vars(&[("CONFIG_FILE", "/no/such/file.yaml")])).is_err());
        Ok(())
    }
}
