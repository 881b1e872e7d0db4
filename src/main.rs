use anyhow::{Context, Result};
use clap::Parser;
use food_snake::game::{GameConfig, GameEngine};
use food_snake::modes::HumanMode;
use log::{LevelFilter, info};
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "food_snake")]
#[command(version, about = "Snake game with speed boost and inverted-controls food")]
struct Cli {
    /// JSON file with game settings; missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Milliseconds between game ticks
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Fixed viewport width (cells are 20 units wide); defaults to the terminal size
    #[arg(long, requires = "viewport_height")]
    viewport_width: Option<u32>,

    /// Fixed viewport height
    #[arg(long, requires = "viewport_width")]
    viewport_height: Option<u32>,

    /// Never spawn food on top of the snake
    #[arg(long)]
    food_avoids_snake: bool,

    /// Seed for reproducible food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the log (the terminal belongs to the game)
    #[arg(long, default_value = "food_snake.log")]
    log_file: PathBuf,

    /// Log every food effect and modifier expiry
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }
        if let (Some(width), Some(height)) = (self.viewport_width, self.viewport_height) {
            config.viewport_width = width;
            config.viewport_height = height;
            config.fit_to_terminal = false;
        }
        if self.food_avoids_snake {
            config.food_avoids_snake = true;
        }

        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {:?}", cli.log_file))?;
    WriteLogger::init(level, Config::default(), log_file).context("Failed to initialize logger")?;

    let config = cli.game_config()?;
    info!("starting with {:?}", config);

    let engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, seed)?,
        None => GameEngine::new(config)?,
    };

    let mut human_mode = HumanMode::new(engine);
    human_mode.run().await?;

    Ok(())
}
