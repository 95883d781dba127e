use anyhow::Result;
use rkshell::Shell;

fn main() -> Result<()> {
    println!("Welcome to RKshell. PID: {}", std::process::id());
    rkshell::signals::install()?;
    Shell::default().repl()
}
