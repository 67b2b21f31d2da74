//! Init command implementation
//!
//! Writes a commented `signal.toml`, a `.env.example` listing the secrets the
//! config refers to, and the `data/` directory used by the default database.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    Success,
    /// signal.toml is already present and `--force` was not given
    AlreadyExists,
    Error(String),
}

/// Run the init command
pub fn run(path: &Path, force: bool, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Signal");

    let config_path = path.join("signal.toml");
    if config_path.exists() && !force {
        output.warning("signal.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let data_dir = path.join("data");
    if let Err(e) = fs::create_dir_all(&data_dir) {
        output.error(&format!("Failed to create data/: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("directory", "data/");

    let files: [(PathBuf, &str, &str); 2] = [
        (config_path, CONFIG_TEMPLATE, "signal.toml"),
        (path.join(".env.example"), ENV_TEMPLATE, ".env.example"),
    ];
    for (file, content, label) in &files {
        if let Err(e) = write_file(file, content, force) {
            output.error(&format!("Failed to create {}: {}", label, e));
            return InitResult::Error(e.to_string());
        }
        output.created("file", label);
    }

    let gitignore = path.join(".gitignore");
    if !gitignore.exists() {
        match write_file(&gitignore, GITIGNORE_TEMPLATE, false) {
            Ok(()) => output.created("file", ".gitignore"),
            Err(e) => output.warning(&format!("Failed to create .gitignore: {}", e)),
        }
    }

    output.success("Signal initialized");
    output.header("Next Steps");
    output.info("1. Provide the search key:");
    output.command("cp .env.example .env");
    output.info("2. Start Ollama, or switch [llm] to openai:");
    output.command("ollama pull llama3.2");
    output.info("3. Start the server:");
    output.command("signal-server");
    output.hint("API docs are served at /swagger-ui when built with the 'swagger-ui' feature");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

const CONFIG_TEMPLATE: &str = r#"# Signal configuration
# Generated by: signal-server init
#
# Secrets are read from the environment variables named here, never from
# this file. Changes to [pipeline] stage_timeout_secs apply to jobs submitted
# after the file is saved.

[server]
host = "0.0.0.0"
port = 8000
log_level = "info"
# "text" or "json"
log_format = "text"
cors_origins = ["http://localhost", "http://localhost:3000"]

[database]
# Local libsql file, or ":memory:"
url = "./data/signal.db"

[llm]
# "ollama" or "openai"
provider = "ollama"
model = "llama3.2"
base_url = "http://localhost:11434"
# api_key_env = "OPENAI_API_KEY"

[search]
api_key_env = "SERPAPI_KEY"
endpoint = "https://serpapi.com/search.json"
num_sources = 10
fetch_timeout_secs = 20

[pipeline]
stage_timeout_secs = 180
max_concurrent_calls = 8

[progress]
replay_capacity = 64
retention_secs = 300
"#;

const ENV_TEMPLATE: &str = r#"# Signal environment variables
# Copy this file to .env and fill in the values.

# REQUIRED: SerpAPI key for the news search stage
SERPAPI_KEY=your-serpapi-key

# Optional: only when [llm] provider = "openai"
# OPENAI_API_KEY=sk-...

# Optional: overrides [server] log_level
RUST_LOG=info,signal=debug
"#;

const GITIGNORE_TEMPLATE: &str = r#"/data/
*.db
*.db-journal
.env
/target/
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::SignalConfig;
    use tempfile::TempDir;

    #[test]
    fn test_template_is_valid_config() {
        let config = SignalConfig::from_toml(CONFIG_TEMPLATE).expect("template should parse");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.search.api_key_env, "SERPAPI_KEY");
        assert_eq!(config.pipeline.stage_timeout_secs, 180);
    }

    #[test]
    fn test_env_template_names_secrets() {
        assert!(ENV_TEMPLATE.contains("SERPAPI_KEY"));
        assert!(ENV_TEMPLATE.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_run_creates_files() {
        let dir = TempDir::new().unwrap();
        let result = run(dir.path(), false, &Output::no_color());

        assert_eq!(result, InitResult::Success);
        assert!(dir.path().join("signal.toml").exists());
        assert!(dir.path().join(".env.example").exists());
        assert!(dir.path().join(".gitignore").exists());
        assert!(dir.path().join("data").is_dir());
    }

    #[test]
    fn test_run_refuses_existing_without_force() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("signal.toml"), "existing").unwrap();

        let result = run(dir.path(), false, &Output::no_color());
        assert_eq!(result, InitResult::AlreadyExists);
        assert_eq!(
            fs::read_to_string(dir.path().join("signal.toml")).unwrap(),
            "existing"
        );
    }

    #[test]
    fn test_run_force_overwrites() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("signal.toml"), "existing").unwrap();

        let result = run(dir.path(), true, &Output::no_color());
        assert_eq!(result, InitResult::Success);
        let content = fs::read_to_string(dir.path().join("signal.toml")).unwrap();
        assert!(content.contains("[pipeline]"));
    }

    #[test]
    fn test_keeps_existing_gitignore() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "custom\n").unwrap();

        run(dir.path(), false, &Output::no_color());
        assert_eq!(
            fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            "custom\n"
        );
    }
}
