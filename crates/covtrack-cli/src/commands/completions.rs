use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap_complete::{generate, Shell};
use covtrack_cli::build_cli_command;
use tracing::info;

pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    let Some(path) = out else {
        return write_completions(shell, &mut io::stdout().lock());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_completions(shell, &mut file)?;
    info!(?shell, path = %path.display(), "wrote completion script");
    println!("Wrote {shell} completion to {}", path.display());
    Ok(())
}

/// Completion script for the `covtrack` command tree.
fn write_completions<W: Write>(shell: Shell, out: &mut W) -> Result<()> {
    let mut cmd = build_cli_command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scripts_cover_subcommands() {
        let mut out = Vec::new();
        write_completions(Shell::Zsh, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("covtrack"));
        assert!(script.contains("explore"));
    }

    #[test]
    fn writes_into_new_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shell/covtrack.fish");
        handle(Shell::Fish, Some(&path)).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("covtrack"));
    }
}
