use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::Parser;
use metalcube::gfx::resources::{EnvironmentMap, EnvironmentPreset};
use metalcube::AppConfig;

/// A spinning metallic cube lit by a procedural environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Borderless fullscreen on the current monitor
    #[arg(long)]
    fullscreen: bool,

    /// Present immediately instead of waiting for vertical sync
    #[arg(long)]
    no_vsync: bool,

    /// Environment used for reflections and ambient light
    #[arg(long, default_value_t = EnvironmentPreset::City, value_parser = environment_parser())]
    environment: EnvironmentPreset,

    /// Cube face edge length of the environment map (power of two, 4 to 1024)
    #[arg(
        long,
        default_value_t = 128,
        value_parser = clap::value_parser!(u32)
            .range(EnvironmentMap::MIN_FACE_SIZE as i64..=EnvironmentMap::MAX_FACE_SIZE as i64)
    )]
    environment_size: u32,
}

fn environment_parser() -> impl TypedValueParser<Value = EnvironmentPreset> {
    PossibleValuesParser::new(EnvironmentPreset::ALL.map(|preset| preset.name()))
        .map(|name| EnvironmentPreset::from_name(&name).unwrap_or_default())
}

impl Args {
    fn into_config(self) -> AppConfig {
        let mut config = AppConfig::default();
        config.window.width = self.width;
        config.window.height = self.height;
        config.window.fullscreen = self.fullscreen;
        config.vsync = !self.no_vsync;
        config.environment.preset = self.environment;
        config.environment.face_size = self.environment_size;
        config
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();
    log::debug!("{:?}", config);
    metalcube::run(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_map_onto_config() {
        let args = Args::parse_from([
            "metalcube",
            "--width",
            "640",
            "--no-vsync",
            "--environment",
            "studio",
            "--environment-size",
            "64",
        ]);
        let config = args.into_config();

        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 800);
        assert!(!config.vsync);
        assert_eq!(config.environment.preset, EnvironmentPreset::Studio);
        assert_eq!(config.environment.face_size, 64);
    }

    #[test]
    fn test_rejects_unknown_environment() {
        let result = Args::try_parse_from(["metalcube", "--environment", "mars"]);
        assert!(result.is_err());

        let args = Args::parse_from(["metalcube", "--environment", "sunset"]);
        assert_eq!(args.environment, EnvironmentPreset::Sunset);
    }

    #[test]
    fn test_rejects_oversized_environment() {
        for size in ["0", "2048", "8192", "65536"] {
            let result = Args::try_parse_from(["metalcube", "--environment-size", size]);
            assert!(result.is_err(), "size {} should be rejected", size);
        }
        let args = Args::parse_from(["metalcube", "--environment-size", "1024"]);
        assert_eq!(args.environment_size, EnvironmentMap::MAX_FACE_SIZE);
    }

    #[test]
    fn test_defaults() {
        let config = Args::parse_from(["metalcube"]).into_config();
        assert!(config.vsync);
        assert!(!config.window.fullscreen);
        assert_eq!(config.environment.preset, EnvironmentPreset::City);
    }
}
