use clap::Parser;
use screenflow::core::config::{self, CliOverrides};
use screenflow::tui;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "screenflow", about = "Switch between screens that share state")]
struct Args {
    /// Screen to show first (home, editor, counter)
    #[arg(short, long)]
    start: Option<String>,

    /// File to write logs to
    #[arg(long)]
    log_file: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: {e}. Using defaults.");
            config::ScreenflowConfig::default()
        }
    };
    let cli = CliOverrides {
        start_screen: args.start,
        log_file: args.log_file,
        log_level: args.log_level,
    };
    let resolved = config::resolve(&file_config, &cli);

    // Initialize file logger - the terminal belongs to the UI
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    match File::create(&resolved.log_file) {
        Ok(log_file) => {
            let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
        }
        Err(e) => eprintln!(
            "Warning: cannot open log file {}: {e}",
            resolved.log_file.display()
        ),
    }

    log::info!("Screenflow starting up (worker thread '{}')", resolved.worker_name);
    log::debug!("Resolved config: {:?}", resolved);

    tui::run(resolved)
}
