//! labsynth - Terminal front end for the synth engine
//!
//! Run with: cargo run --bin labsynth
//!
//! Logs go to `labsynth.log` in the temp directory so they do not tear up
//! the terminal. Set `RUST_LOG=debug` for note-level detail.

mod app;
mod ui;

use std::fs::File;

use app::App;
use color_eyre::eyre::{Result as EyreResult, WrapErr};

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let mut terminal = ratatui::init();
    let res = App::new().and_then(|mut app| app.run(&mut terminal));
    ratatui::restore();
    res
}

fn init_logging() -> EyreResult<()> {
    let path = std::env::temp_dir().join("labsynth.log");
    let file = File::create(&path).wrap_err_with(|| format!("failed to create {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
