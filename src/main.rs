use anyhow::Result;

#[cfg(windows)]
fn main() -> Result<()> {
    use anyhow::Context;
    use memprobe::config;
    use memprobe::repl::Repl;
    use memprobe::{MemorySource, ScanEngine, Session};
    use std::io::{self, BufRead, Write};
    use tracing::Level;

    let config = config::load_config();

    // Logs go to stderr so scan output stays pipeable.
    let level = config.logging.level.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    println!("Enter window name:");
    let mut window_name = String::new();
    io::stdin()
        .lock()
        .read_line(&mut window_name)
        .context("failed to read window name")?;
    let window_name = window_name.trim_end_matches(['\r', '\n']);

    let session = Session::attach(window_name).context("attach failed")?;

    println!("Found:");
    println!("{}", session.process_name());
    println!("ID: {}", session.process_id());
    let bits = if session.is_64_bit() { "64 bit" } else { "32 bit" };
    println!("{}\n", bits);

    io::stdout().flush()?;

    memprobe::repl::print_help();

    let mut repl = Repl::new(ScanEngine::new(session), &config.scanner);
    repl.run()?;

    Ok(())
}

#[cfg(not(windows))]
fn main() -> Result<()> {
    anyhow::bail!("memprobe attaches to live processes through Win32 and only runs on Windows");
}
