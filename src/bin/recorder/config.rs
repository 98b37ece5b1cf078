use clap::Parser;
use std::path::PathBuf;

/// Recorder service settings. Every flag can also come from the environment
/// (or a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(name = "recorder", about = "Browser-step recording service")]
pub struct Config {
    #[arg(long, env = "BROWSER_STEPS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// First port to try; the next nine are tried if it is taken.
    #[arg(long, env = "BROWSER_STEPS_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Where finished recipes are written.
    #[arg(long, env = "BROWSER_STEPS_RECIPE_DIR")]
    pub recipe_dir: Option<PathBuf>,

    #[arg(long, env = "BROWSER_STEPS_LOG", default_value = "info")]
    pub log: String,
}

impl Config {
    pub fn recipe_dir(&self) -> PathBuf {
        self.recipe_dir.clone().unwrap_or_else(default_recipe_dir)
    }
}

fn default_recipe_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("browser-steps").join("recipes"))
        .unwrap_or_else(|| PathBuf::from("recipes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "recorder",
            "--port",
            "4100",
            "--recipe-dir",
            "/tmp/recipes",
        ])
        .unwrap();
        assert_eq!(config.port, 4100);
        assert_eq!(config.recipe_dir(), PathBuf::from("/tmp/recipes"));
    }

    #[test]
    fn default_recipe_dir_ends_in_recipes() {
        let config = Config::try_parse_from(["recorder"]).unwrap();
        if config.recipe_dir.is_none() {
            assert!(config.recipe_dir().ends_with("recipes"));
        }
    }
}
