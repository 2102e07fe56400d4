//! Interactive credential setup (`pubmed-mcp setup`).
//!
//! Collects an NCBI API key and contact email, writes them to a JSON config
//! file and prints the shell commands that export them as environment
//! variables.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ConfigFile, Credentials, ENV_API_KEY, ENV_EMAIL};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("email pattern is valid")
});

/// Where NCBI hands out API keys.
pub const API_KEY_URL: &str = "https://www.ncbi.nlm.nih.gov/account/";

/// Options for the `setup` subcommand.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Key given on the command line; prompted for when absent.
    pub api_key: Option<String>,
    /// Email given on the command line; prompted for when absent.
    pub email: Option<String>,
    /// Config file to write.
    pub config: PathBuf,
    /// Skip writing the config file.
    pub env_only: bool,
}

/// Loose email format check.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Shell dialect for the printed environment commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// sh, bash, zsh.
    Posix,
    /// cmd.exe.
    Windows,
}

impl Shell {
    /// Dialect of the platform we are running on.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Commands that set the credentials for this session and permanently.
#[must_use]
pub fn env_commands(credentials: &Credentials, shell: Shell) -> String {
    let vars: Vec<(&str, &str)> = [
        (ENV_API_KEY, credentials.api_key.as_deref()),
        (ENV_EMAIL, credentials.email.as_deref()),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| (name, v)))
    .collect();

    if vars.is_empty() {
        return String::new();
    }

    let mut out = String::from("To set environment variables for the current session:\n");
    match shell {
        Shell::Posix => {
            for (name, value) in &vars {
                out.push_str(&format!("export {name}='{value}'\n"));
            }
            out.push_str(
                "\nTo set environment variables permanently (add to ~/.bashrc or ~/.zshrc):\n",
            );
            for (name, value) in &vars {
                out.push_str(&format!("echo 'export {name}=\"{value}\"' >> ~/.bashrc\n"));
            }
            out.push_str("source ~/.bashrc\n");
        }
        Shell::Windows => {
            for (name, value) in &vars {
                out.push_str(&format!("set {name}={value}\n"));
            }
            out.push_str("\nTo set environment variables permanently (Windows):\n");
            for (name, value) in &vars {
                out.push_str(&format!("setx {name} \"{value}\"\n"));
            }
        }
    }
    out
}

fn prompt<R, W>(input: &mut R, out: &mut W, label: &str) -> std::io::Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{label}: ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Run the setup flow against the given input and output.
///
/// Returns the credentials that were collected.
///
/// # Errors
///
/// Returns error on I/O failure while prompting. A config file that cannot be
/// written is reported on `out` and does not fail the run.
pub fn run<R: BufRead, W: Write>(
    options: &SetupOptions,
    mut input: R,
    mut out: W,
) -> anyhow::Result<Credentials> {
    writeln!(out, "PubMed MCP API key setup")?;
    writeln!(out, "An NCBI API key raises the request rate limit and results per query.")?;
    writeln!(out)?;

    let mut api_key = options.api_key.clone().unwrap_or_default();
    if api_key.trim().is_empty() {
        writeln!(out, "Please enter your NCBI API key")?;
        writeln!(out, "(If you don't have one, get it at {API_KEY_URL})")?;
        api_key = prompt(&mut input, &mut out, "API Key")?;
    }

    let mut email = options.email.clone().unwrap_or_default();
    if email.trim().is_empty() {
        writeln!(out, "Please enter your email address")?;
        writeln!(out, "(NCBI recommends providing an email in case they need to contact you)")?;
        email = prompt(&mut input, &mut out, "Email")?;
        while !email.is_empty() && !validate_email(&email) {
            writeln!(out, "Invalid email format. Please try again.")?;
            email = prompt(&mut input, &mut out, "Email")?;
        }
    }

    let credentials = Credentials::new(Some(api_key), Some(email));

    if credentials.api_key.is_none() {
        writeln!(out, "Warning: No API key provided. You will have reduced query limits.")?;
    }
    if credentials.email.is_none() {
        writeln!(out, "Warning: No email provided. NCBI recommends including an email address.")?;
    }

    if !options.env_only && !credentials.is_empty() {
        let file = ConfigFile {
            api_key: credentials.api_key.clone(),
            email: credentials.email.clone(),
        };
        match file.save(&options.config) {
            Ok(()) => writeln!(out, "Configuration saved to {}", options.config.display())?,
            Err(e) => {
                tracing::warn!(error = %e, "Could not save config file");
                writeln!(out, "Error saving configuration: {e}")?;
            }
        }
    }

    let commands = env_commands(&credentials, Shell::current());
    if !commands.is_empty() {
        writeln!(out)?;
        write!(out, "{commands}")?;
    }

    writeln!(out)?;
    writeln!(out, "You can now run the PubMed MCP server with your credentials:")?;
    writeln!(out, "1. Using the config file:")?;
    writeln!(out, "   pubmed-mcp --config {}", options.config.display())?;
    writeln!(out, "2. Using command line arguments:")?;
    writeln!(
        out,
        "   pubmed-mcp --api-key {} --email {}",
        credentials.api_key.as_deref().unwrap_or("<key>"),
        credentials.email.as_deref().unwrap_or("<email>")
    )?;
    writeln!(out, "3. Using environment variables (after setting them up as shown above):")?;
    writeln!(out, "   pubmed-mcp")?;

    Ok(credentials)
}
