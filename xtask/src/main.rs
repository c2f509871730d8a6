//! Development tasks for dotsetup.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask", about = "Development tasks for dotsetup")]
enum Task {
    /// Render man pages for `setup` and each of its subcommands
    Man {
        /// Output directory
        #[arg(short, long, default_value = "man")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    match Task::parse() {
        Task::Man { output } => generate_man_pages(&output),
    }
}

fn generate_man_pages(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let cmd = dotsetup::cli::Cli::command();
    render(&cmd, "setup", output_dir)?;

    for sub in cmd.get_subcommands().filter(|s| s.get_name() != "completion") {
        render(sub, &format!("setup-{}", sub.get_name()), output_dir)?;
    }

    println!("Man pages written to {}", output_dir.display());
    Ok(())
}

fn render(cmd: &clap::Command, title: &str, output_dir: &Path) -> Result<()> {
    let path = output_dir.join(format!("{title}.1"));
    let file = fs::File::create(&path)
        .with_context(|| format!("Failed to create man page: {}", path.display()))?;
    clap_mangen::Man::new(cmd.clone())
        .title(title)
        .render(&mut BufWriter::new(file))?;
    println!("  {}", path.display());
    Ok(())
}
