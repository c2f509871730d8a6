#[cfg(test)]
pub mod fixtures {
    use crate::tasks::Backup;
    use crate::{SetupContext, config::Config};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A machine root, an applications directory and one registered backup,
    /// all inside a temporary directory.
    pub struct Fixture {
        pub temp_dir: TempDir,
        pub root: PathBuf,
        pub apps_dir: PathBuf,
        pub machine_dir: PathBuf,
        pub backup_dir: PathBuf,
        pub config_path: PathBuf,
    }

    impl Fixture {
        pub fn new() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let root = temp_dir.path().to_path_buf();
            let apps_dir = root.join("apps");
            let machine_dir = root.join("machine");
            let backup_dir = root.join("dotfiles/dotfiles1");
            let config_path = root.join("setup.toml");

            fs::create_dir_all(&apps_dir).unwrap();
            fs::create_dir_all(&machine_dir).unwrap();

            let mut config = Config::default();
            config.backups = vec![backup_dir.clone()];
            config.core.backup_root = root.join("dotfiles");
            config.core.restore_root = machine_dir.clone();
            config.core.applications_dir = Some(apps_dir.clone());
            config.save(&config_path).unwrap();

            Self {
                temp_dir,
                root,
                apps_dir,
                machine_dir,
                backup_dir,
                config_path,
            }
        }

        /// Writes `<apps>/<name>.toml`.
        pub fn write_package(&self, name: &str, content: &str) {
            fs::write(self.apps_dir.join(format!("{name}.toml")), content).unwrap();
        }

        /// Writes a file under the machine root and returns its path.
        pub fn write_machine(&self, rel: &str, content: &str) -> PathBuf {
            write(&self.machine_dir.join(rel), content)
        }

        /// Writes a file under the backup directory and returns its path.
        pub fn write_backup(&self, rel: &str, content: &str) -> PathBuf {
            write(&self.backup_dir.join(rel), content)
        }

        pub fn load(&self) -> Backup {
            Backup::load(&self.backup_dir, Some(&self.apps_dir)).unwrap()
        }

        pub fn context(&self) -> SetupContext {
            let mut ctx = SetupContext::new_explicit(self.config_path.clone()).unwrap();
            ctx.non_interactive = true;
            ctx
        }
    }

    fn write(path: &Path, content: &str) -> PathBuf {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        path.to_path_buf()
    }
}
