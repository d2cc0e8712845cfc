use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::config::{state_dir, LOG_FILE};

/// Initialise the logger for the terminal app.
/// INFO by default, RUST_LOG overrides. The TUI owns stdout, so records go to
/// `<project>/.beatgrid/beatgrid.log`; stderr is only used if that file can't
/// be opened. Lines start with `\r` so they stay readable in raw mode.
pub fn init_logger(project_dir: &Path) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "\r[{} {:5} {}] {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        });

    let dir = state_dir(project_dir);
    let file = std::fs::create_dir_all(&dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))
    });
    if let Ok(file) = file {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // a second init (tests, embedding) is harmless
    let _ = builder.try_init();
}
