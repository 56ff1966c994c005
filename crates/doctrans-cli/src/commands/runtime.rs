use crate::errors::CliError;
use colored::Colorize;
use doctrans_bridge::Bridge;
use doctrans_config::Config;

/// Locate the Python runtime and print what the bridge would use
pub fn handle_runtime() -> Result<(), CliError> {
    let config = Config::load()?;
    let bridge = Bridge::new(&config)?;
    let interpreter = bridge.interpreter();
    let scripts = bridge.scripts();

    println!("{}", "Runtime:".bold().green());
    println!(
        "  {}: {}",
        "interpreter".cyan(),
        interpreter.executable.display()
    );
    println!("  {}: {}", "version".cyan(), interpreter.version);
    println!("  {}: {}", "base-dir".cyan(), bridge.base_dir().display());
    println!("  {}: {}", "translate".cyan(), scripts.translate.display());
    println!(
        "  {}: {}",
        "translate-with-progress".cyan(),
        scripts.translate_with_progress.display()
    );
    println!(
        "  {}: {}",
        "test-connection".cyan(),
        scripts.test_connection.display()
    );
    match bridge.timeout() {
        Some(limit) => println!("  {}: {}s", "timeout".cyan(), limit.as_secs()),
        None => println!("  {}: {}", "timeout".cyan(), "none".yellow()),
    }
    Ok(())
}
