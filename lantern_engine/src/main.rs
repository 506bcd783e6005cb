#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! ** Lantern **
//! Text-adventure engine with a bundled demo world.

use lantern_engine::style::GameStyle;
use lantern_engine::{ConsoleIo, LANTERN_VERSION, demo, save_files};

use env_logger::Env;
use log::{error, info};
use textwrap::{fill, termwidth};

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
    info!("Starting Lantern engine (version {LANTERN_VERSION})");

    save_files::set_active_save_dir(save_files::default_save_dir());

    let io = match ConsoleIo::new() {
        Ok(io) => io,
        Err(err) => {
            error!("could not initialize the console: {err:#}");
            eprintln!("{}", format!("Could not initialize the console: {err:#}").error_style());
            return ExitCode::from(2);
        },
    };

    let mut engine = match demo::demo_blueprint().build(Box::new(io)) {
        Ok(engine) => engine,
        Err(err) => {
            error!("world construction failed: {err:#}");
            eprintln!("{}", format!("World construction failed: {err:#}").error_style());
            return ExitCode::from(1);
        },
    };

    println!(
        "{:^width$}",
        format!("LANTERN v{LANTERN_VERSION}").banner_style(),
        width = termwidth()
    );
    println!(
        "{}\n",
        fill(
            "An interactive fiction engine. Type commands like LOOK, TAKE LANTERN, or GO NORTH; \
             SAVE <name>, RESTORE <name>, and QUIT also work.",
            termwidth()
        )
    );

    match engine.run() {
        Ok(()) => {
            info!("session ended normally");
            ExitCode::SUCCESS
        },
        Err(err) => {
            error!("fatal engine error: {err:#}");
            eprintln!("{}", format!("Fatal engine error: {err:#}").error_style());
            ExitCode::from(2)
        },
    }
}
