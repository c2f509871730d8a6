#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use dotsetup::config::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A machine root, a set of package definitions and one registered backup,
/// laid out like a small real setup:
///
/// - `app`: no files
/// - `vim`: only on the machine
/// - `code`: on both sides with different content
/// - `bash`: `.bashrc` only in the backup, `.bash_local` nowhere
/// - `git`: nothing anywhere
/// - `python`: on both sides with the same content
/// - `rubocop`: already linked
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
    pub apps_dir: PathBuf,
    pub machine_dir: PathBuf,
    pub backup_root: PathBuf,
    pub dotfiles_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        let env = Self {
            config_path: root.join("setup.toml"),
            apps_dir: root.join("apps"),
            machine_dir: root.join("machine"),
            backup_root: root.join("dotfiles"),
            dotfiles_dir: root.join("dotfiles/dotfiles1"),
            temp_dir,
        };

        fs::create_dir_all(&env.apps_dir)?;
        fs::create_dir_all(&env.machine_dir)?;
        env.write_config(&[env.dotfiles_dir.clone()])?;

        env.write_package("app", "name = \"app\"\nfiles = []")?;

        env.write_package("vim", "name = \"vim\"\nfiles = [\".vimrc\"]")?;
        env.write_machine(".vimrc", "; Vim configuration.")?;

        env.write_package("code", "name = \"code\"\nfiles = [\".vscode\"]")?;
        env.write_backup("code/_vscode", "some content")?;
        env.write_machine(".vscode", "different content")?;

        env.write_package("bash", "name = \"bash\"\nfiles = [\".bashrc\", \".bash_local\"]")?;
        env.write_backup("bash/_bashrc", "bashrc file")?;

        env.write_package("git", "name = \"git\"\nfiles = [\".gitignore\", \".gitconfig\"]")?;

        env.write_package("python", "name = \"python\"\nfiles = [\".pythonrc\"]")?;
        env.write_backup("python/_pythonrc", "pythonrc")?;
        env.write_machine(".pythonrc", "pythonrc")?;

        env.write_package("rubocop", "name = \"rubocop\"\nfiles = [\".rubocop\"]")?;
        let rubocop = env.write_backup("rubocop/_rubocop", "rubocop")?;
        fs::hard_link(rubocop, env.machine(".rubocop"))?;

        Ok(env)
    }

    /// Writes the global config registering `backups`.
    pub fn write_config(&self, backups: &[PathBuf]) -> Result<()> {
        let mut config = Config::default();
        config.backups = backups.to_vec();
        config.core.backup_root = self.backup_root.clone();
        config.core.restore_root = self.machine_dir.clone();
        config.core.applications_dir = Some(self.apps_dir.clone());
        config.save(&self.config_path)
    }

    /// Writes the registry of the default backup.
    pub fn write_registry(&self, enabled: &[&str], disabled: &[&str]) -> Result<()> {
        let quote = |names: &[&str]| {
            names
                .iter()
                .map(|n| format!("\"{n}\""))
                .collect::<Vec<_>>()
                .join(", ")
        };
        write(
            &self.dotfiles_dir.join("config.toml"),
            &format!(
                "enabled_task_names = [{}]\ndisabled_task_names = [{}]\n",
                quote(enabled),
                quote(disabled)
            ),
        )?;
        Ok(())
    }

    pub fn write_package(&self, name: &str, content: &str) -> Result<PathBuf> {
        write(&self.apps_dir.join(format!("{name}.toml")), content)
    }

    pub fn write_machine(&self, rel: &str, content: &str) -> Result<PathBuf> {
        write(&self.machine(rel), content)
    }

    pub fn write_backup(&self, rel: &str, content: &str) -> Result<PathBuf> {
        write(&self.backup(rel), content)
    }

    /// Path under the machine root.
    pub fn machine(&self, rel: &str) -> PathBuf {
        self.machine_dir.join(rel)
    }

    /// Path under the default backup.
    pub fn backup(&self, rel: &str) -> PathBuf {
        self.dotfiles_dir.join(rel)
    }

    /// The `setup` binary pointed at this environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("setup").expect("setup binary");
        cmd.env("DOTSETUP_CONFIG_PATH", &self.config_path)
            .env("HOME", self.temp_dir.path())
            .env("NO_COLOR", "1")
            .env_remove("DOTSETUP_LOG");
        cmd
    }

    /// Runs `setup` with `args`, asserts success and returns stdout.
    pub fn run(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).output().expect("run setup");
        assert!(
            output.status.success(),
            "setup {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

fn write(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

/// Asserts `restore` is a symlink resolving to `backup` with `content`.
pub fn assert_symlinks(backup: &Path, restore: &Path, content: Option<&str>) {
    assert!(is_symlink(restore), "{} is not a symlink", restore.display());
    assert_eq!(fs::read_link(restore).unwrap(), backup);
    if let Some(content) = content {
        assert_eq!(read(backup), content);
    }
}

/// Asserts `restore` is an independent copy of `backup`.
pub fn assert_copies(backup: &Path, restore: &Path, content: Option<&str>) {
    assert!(!is_symlink(restore), "{} is a symlink", restore.display());
    assert_eq!(read(backup), read(restore));
    if let Some(content) = content {
        assert_eq!(read(backup), content);
    }
}
