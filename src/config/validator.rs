use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Tracks which configuration fields are actually used at runtime
pub struct ConfigValidator {
    /// Set of valid configuration fields that are recognized by setup
    known_fields: HashSet<&'static str>,
    /// Set of deprecated configuration fields that should trigger warnings
    deprecated_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = HashSet::from([
            "backups",
            "core",
            "core.backup_root",
            "core.restore_root",
            "core.applications_dir",
            "core.cleanup_prefix",
            "sync",
            "sync.copy",
            "cleanup",
            "cleanup.ignore_patterns",
        ]);

        // The YAML-era key for the backup root
        let deprecated_fields = HashSet::from(["core.backup_dir"]);

        Self {
            known_fields,
            deprecated_fields,
        }
    }

    /// Validate a loaded configuration file and warn about issues
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path)?;
        let parsed: toml::Table = toml::from_str(&content)?;

        let warnings = self.collect_warnings(&parsed);

        if !warnings.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for warning in warnings {
                eprintln!("  {warning}");
            }
            eprintln!();
        }

        Ok(())
    }

    /// Builds one warning per unknown or deprecated field
    fn collect_warnings(&self, parsed: &toml::Table) -> Vec<String> {
        let mut unknown_fields = Vec::new();
        let mut deprecated_used = Vec::new();

        self.check_table(parsed, "", &mut unknown_fields, &mut deprecated_used);

        let mut warnings: Vec<String> = unknown_fields
            .iter()
            .map(|field| format!("Unknown configuration field: {}", field.yellow()))
            .collect();

        for field in &deprecated_used {
            let suggestion = match field.as_str() {
                "core.backup_dir" => "Use core.backup_root instead.",
                _ => "This field is deprecated and will be removed in a future version.",
            };
            warnings.push(format!(
                "Deprecated field '{}': {}",
                field.yellow(),
                suggestion.dimmed()
            ));
        }

        warnings
    }

    /// Recursively checks a TOML table for unknown and deprecated fields
    fn check_table(
        &self,
        table: &toml::Table,
        prefix: &str,
        unknown: &mut Vec<String>,
        deprecated: &mut Vec<String>,
    ) {
        for (key, value) in table {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if self.deprecated_fields.contains(full_key.as_str()) {
                deprecated.push(full_key);
                continue;
            }

            if !self.known_fields.contains(full_key.as_str()) {
                unknown.push(full_key);
                continue;
            }

            if let toml::Value::Table(nested) = value {
                self.check_table(nested, &full_key, unknown, deprecated);
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
