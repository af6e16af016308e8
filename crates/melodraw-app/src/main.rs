//! Main application entry point (native).

#[cfg(feature = "native")]
mod cli {
    use clap::Parser;
    use melodraw_app::{AppConfig, FileShareSink, Session, ShortcutRegistry, load_script};
    use melodraw_render::Rasterizer;
    use std::path::PathBuf;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error(transparent)]
        Config(#[from] melodraw_app::ConfigError),
        #[error(transparent)]
        Script(#[from] melodraw_app::ScriptError),
        #[error("could not write snapshot to {0}")]
        Share(String),
    }

    #[derive(Parser, Debug)]
    #[command(name = "melodraw", about = "Replay a recorded Melodraw session")]
    pub struct Cli {
        /// Recorded session (JSON list of gesture, action and key steps).
        #[arg(required_unless_present = "shortcuts")]
        pub script: Option<PathBuf>,

        /// Session configuration file.
        #[arg(long)]
        pub config: Option<PathBuf>,

        /// Write a PNG snapshot of the final canvas here. Share steps in the
        /// script write to the same file.
        #[arg(long)]
        pub out: Option<PathBuf>,

        /// Print the keyboard shortcuts.
        #[arg(long)]
        pub shortcuts: bool,
    }

    fn rasterizer() -> Box<dyn Rasterizer> {
        #[cfg(feature = "vello")]
        {
            match melodraw_render::VelloRasterizer::new() {
                Ok(rasterizer) => return Box::new(rasterizer),
                Err(e) => log::warn!("GPU rendering unavailable, using CPU rasterizer: {}", e),
            }
        }
        Box::new(melodraw_render::CpuRasterizer::new())
    }

    pub fn run(cli: Cli) -> Result<(), CliError> {
        if cli.shortcuts {
            ShortcutRegistry::print_all();
        }
        let Some(script) = cli.script else {
            return Ok(());
        };

        let config = match &cli.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        log::info!("Starting {} ({}x{})", config.title, config.width, config.height);

        let steps = load_script(&script)?;
        let mut session = Session::new(config).with_rasterizer(Some(rasterizer()));
        if let Some(out) = &cli.out {
            session = session.with_share_sink(Box::new(FileShareSink::new(out)));
        }

        session.replay(&steps);
        log::info!("Final controls: {:?}", session.controls());

        if let Some(out) = cli.out {
            log::info!("Writing final snapshot to {}", out.display());
            if session.share().is_none() {
                return Err(CliError::Share(out.display().to_string()));
            }
        }
        Ok(())
    }

}

#[cfg(feature = "native")]
fn main() {
    use clap::Parser;

    env_logger::init();

    if let Err(e) = cli::run(cli::Cli::parse()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
