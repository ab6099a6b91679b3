//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use quotesync_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str = "data_dir, remote_url, sync_enabled, sync_interval_secs, fetch_limit, \
                          request_timeout_secs, push_local_only, push_on_fetch_failure, \
                          import_policy, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "remote_url": config.remote_url,
                    "sync_enabled": config.sync_enabled,
                    "sync_interval_secs": config.sync_interval_secs,
                    "fetch_limit": config.fetch_limit,
                    "request_timeout_secs": config.request_timeout_secs,
                    "push_local_only": config.push_local_only,
                    "push_on_fetch_failure": config.push_on_fetch_failure,
                    "import_policy": config.import_policy.to_string(),
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:              {}", config.data_dir.display());
            println!("  remote_url:            {}", config.remote_url);
            println!("  sync_enabled:          {}", config.sync_enabled);
            println!("  sync_interval_secs:    {}", config.sync_interval_secs);
            println!("  fetch_limit:           {}", config.fetch_limit);
            println!("  request_timeout_secs:  {}", config.request_timeout_secs);
            println!("  push_local_only:       {}", config.push_local_only);
            println!("  push_on_fetch_failure: {}", config.push_on_fetch_failure);
            println!("  import_policy:         {}", config.import_policy);
            println!(
                "  log_file:              {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "remote_url" => {
            if value.is_empty() {
                bail!("remote_url cannot be empty");
            }
            config.remote_url = value.to_string();
        }
        "sync_enabled" => {
            config.sync_enabled = value
                .parse()
                .context("Invalid value for sync_enabled. Use 'true' or 'false'.")?;
        }
        "sync_interval_secs" => {
            config.sync_interval_secs = value
                .parse()
                .context("Invalid value for sync_interval_secs. Use a number of seconds.")?;
        }
        "fetch_limit" => {
            config.fetch_limit = value
                .parse()
                .context("Invalid value for fetch_limit. Use a whole number.")?;
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = value
                .parse()
                .context("Invalid value for request_timeout_secs. Use a number of seconds.")?;
        }
        "push_local_only" => {
            config.push_local_only = value
                .parse()
                .context("Invalid value for push_local_only. Use 'true' or 'false'.")?;
        }
        "push_on_fetch_failure" => {
            config.push_on_fetch_failure = value
                .parse()
                .context("Invalid value for push_on_fetch_failure. Use 'true' or 'false'.")?;
        }
        "import_policy" => {
            config.import_policy = value.parse()?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotesync_core::ImportPolicy;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "sync_enabled", "false").unwrap();
        apply(&mut config, "sync_interval_secs", "60").unwrap();
        apply(&mut config, "import_policy", "append").unwrap();
        apply(&mut config, "push_on_fetch_failure", "true").unwrap();
        apply(&mut config, "log_file", "/tmp/quotesync.log").unwrap();

        assert!(!config.sync_enabled);
        assert_eq!(config.sync_interval_secs, 60);
        assert_eq!(config.import_policy, ImportPolicy::Append);
        assert!(config.push_on_fetch_failure);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/quotesync.log")));

        apply(&mut config, "log_file", "none").unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();

        assert!(apply(&mut config, "sync_enabled", "maybe").is_err());
        assert!(apply(&mut config, "fetch_limit", "-1").is_err());
        assert!(apply(&mut config, "import_policy", "merge").is_err());
        assert!(apply(&mut config, "remote_url", "").is_err());

        let err = apply(&mut config, "favorite", "x").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }
}
