//! Lumina sign-in gate
//!
//! Command-line front end for the admission core. It signs this
//! installation in with a license key or the administrator account,
//! keeps the resulting session in the state directory, and gives the
//! operator key issuance and override tooling.
//!
//! Usage:
//!   lumina-gate login --key KSR-7KQM-X2PD-9HTA --remember
//!   lumina-gate admin --username owner
//!   lumina-gate issue-key --duration monthly --price 150000

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use ed25519_dalek::SigningKey;
use lumina_crypto::random_bytes;
use lumina_gate::{GateConfig, ShellStore, encode_key_bytes, read_signing_key, write_signing_key};
use lumina_license::{
    AccessGate, CredentialOutcome, DeviceIdentity, KeyIssuer, LicenseError, LoginOutcome,
    MAX_OVERRIDE_VALIDITY_SECS, OverrideClaims, sign_override_token,
};
use lumina_store::{KeyDuration, KeyRecordStore, SqliteStore};
use lumina_types::DeviceId;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit code for a refused sign-in.
const EXIT_DENIED: u8 = 2;
/// Exit code when the document store cannot be reached.
const EXIT_UNAVAILABLE: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "lumina-gate")]
#[command(about = "Lumina point-of-sale sign-in and license tooling")]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Document store path (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Local state directory (overrides the config file)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print this installation's device identity
    DeviceId,
    /// Sign in with a license key
    Login {
        /// License key; defaults to the remembered key
        #[arg(short, long)]
        key: Option<String>,
        /// Remember the key for the next sign-in
        #[arg(long)]
        remember: bool,
    },
    /// Sign in as administrator (creates the account on first use)
    Admin {
        #[arg(short, long)]
        username: String,
        /// Password; read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Show the current session
    Status,
    /// End the current session
    Logout,
    /// Issue a new license key (admin session required)
    IssueKey {
        /// weekly, monthly or yearly
        #[arg(short, long)]
        duration: KeyDuration,
        /// Price in minor currency units
        #[arg(long, default_value = "0")]
        price: i64,
    },
    /// List issued license keys (admin session required)
    Keys,
    /// Generate an operator override signing key
    OverrideKeygen {
        /// Where to write the private key
        #[arg(long)]
        out: PathBuf,
    },
    /// Sign an override token for one device
    OverrideToken {
        /// Private key written by override-keygen
        #[arg(long)]
        signing_key: PathBuf,
        /// Device identity the token admits
        #[arg(long)]
        device: String,
        /// Validity window in hours
        #[arg(long, default_value = "24")]
        valid_hours: i64,
    },
}

/// Resolved settings shared by the subcommands.
struct App {
    config: GateConfig,
    state_dir: PathBuf,
    db_path: PathBuf,
}

impl App {
    fn from_args(args: &Args) -> Result<Self> {
        let mut config = GateConfig::load_or_default(args.config.as_deref())?;
        if let Some(dir) = &args.state_dir {
            config.state_dir = Some(dir.clone());
        }
        if let Some(db) = &args.db {
            config.database_path = Some(db.clone());
        }
        let state_dir = config.state_dir()?;
        let db_path = config.database_path()?;
        debug!("State directory {:?}, store {:?}", state_dir, db_path);
        Ok(Self {
            config,
            state_dir,
            db_path,
        })
    }

    fn shell(&self) -> ShellStore {
        ShellStore::in_dir(&self.state_dir)
    }

    fn device_id(&self) -> Result<DeviceId> {
        DeviceIdentity::in_dir(&self.state_dir)
            .get_or_create()
            .context("Failed to load device identity")
    }

    fn open_store(&self) -> Result<SqliteStore> {
        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        SqliteStore::open(&self.db_path)
            .with_context(|| format!("Failed to open store {}", self.db_path.display()))
    }

    fn access_gate(&self) -> Result<AccessGate<SqliteStore>> {
        let gate = AccessGate::new(self.open_store()?, self.device_id()?)
            .with_kdf_params(self.config.kdf.clone());
        match self.config.override_key()? {
            Some(public_key) => Ok(gate.with_override_key(&public_key)?),
            None => Ok(gate),
        }
    }

    fn require_admin(&self) -> Result<()> {
        if !self.shell().load()?.is_admin() {
            bail!("An administrator session is required; sign in with `lumina-gate admin`");
        }
        Ok(())
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let ctx = App::from_args(&args)?;
    match args.command {
        Command::DeviceId => {
            println!("{}", ctx.device_id()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Login { key, remember } => login(&ctx, key, remember),
        Command::Admin { username, password } => admin(&ctx, &username, password),
        Command::Status => status(&ctx),
        Command::Logout => {
            let shell = ctx.shell();
            let mut state = shell.load()?;
            if state.logout() {
                shell.save(&state)?;
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::IssueKey { duration, price } => issue_key(&ctx, duration, price),
        Command::Keys => list_keys(&ctx),
        Command::OverrideKeygen { out } => override_keygen(&out),
        Command::OverrideToken {
            signing_key,
            device,
            valid_hours,
        } => override_token(&signing_key, &device, valid_hours),
    }
}

fn login(ctx: &App, key: Option<String>, remember: bool) -> Result<ExitCode> {
    let shell = ctx.shell();
    let mut state = shell.load()?;

    // Signing in with the remembered key keeps it remembered.
    let (key, remember) = match key {
        Some(key) => (key, remember),
        None => match state.remembered_key.clone() {
            Some(key) => (key, true),
            None => bail!("No key given and none remembered; pass --key"),
        },
    };

    let gate = ctx.access_gate()?;
    match gate.login_with_key(&key) {
        Ok(LoginOutcome::Granted(session)) => {
            println!("Signed in as {}", session.role);
            state.key_login(session, &key, remember);
            shell.save(&state)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(LoginOutcome::Denied(reason)) => {
            println!("{reason}");
            Ok(ExitCode::from(EXIT_DENIED))
        }
        Err(e) => unavailable_or(e),
    }
}

fn admin(ctx: &App, username: &str, password: Option<String>) -> Result<ExitCode> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    let gate = ctx.access_gate()?;
    match gate.login_with_credentials(username, &password) {
        Ok(CredentialOutcome::Granted { session, created }) => {
            if created {
                println!("Administrator account created");
            }
            println!("Signed in as {}", session.role);
            let shell = ctx.shell();
            let mut state = shell.load()?;
            state.credential_login(session);
            shell.save(&state)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(CredentialOutcome::Rejected) => {
            println!("Invalid username or password");
            Ok(ExitCode::from(EXIT_DENIED))
        }
        Err(e) => unavailable_or(e),
    }
}

fn status(ctx: &App) -> Result<ExitCode> {
    let state = ctx.shell().load()?;
    match &state.session {
        Some(session) => println!(
            "Signed in as {} since {}",
            session.role,
            session.issued_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("Not signed in"),
    }
    if state.remembered_key.is_some() {
        println!("A license key is remembered");
    }
    println!("Device {}", ctx.device_id()?.short());
    Ok(ExitCode::SUCCESS)
}

fn issue_key(ctx: &App, duration: KeyDuration, price: i64) -> Result<ExitCode> {
    ctx.require_admin()?;
    if price < 0 {
        bail!("Price cannot be negative");
    }
    let record = KeyIssuer::new(ctx.open_store()?)
        .issue(duration, price)
        .context("Failed to issue license key")?;
    println!("{}", record.key);
    println!("  valid until {}", record.valid_until.format("%Y-%m-%d %H:%M UTC"));
    Ok(ExitCode::SUCCESS)
}

fn list_keys(ctx: &App) -> Result<ExitCode> {
    ctx.require_admin()?;
    let keys = ctx.open_store()?.list().context("Failed to list license keys")?;
    if keys.is_empty() {
        println!("No license keys issued");
        return Ok(ExitCode::SUCCESS);
    }
    let now = Utc::now();
    for key in keys {
        let state = if !key.is_active {
            "revoked"
        } else if key.is_expired_at(now) {
            "expired"
        } else {
            "active"
        };
        let device = key
            .bound_device_id
            .as_ref()
            .map_or_else(|| "unbound".to_string(), DeviceId::short);
        println!(
            "{}  {:<7}  {:<7}  until {}  uses {:>4}  {}",
            key.key,
            key.duration.as_str(),
            state,
            key.valid_until.format("%Y-%m-%d"),
            key.usage_count,
            device
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn override_keygen(out: &Path) -> Result<ExitCode> {
    let signing_key = SigningKey::from_bytes(&random_bytes::<32>());
    write_signing_key(out, &signing_key)?;
    info!("Wrote override signing key to {:?}", out);
    println!(
        "override_public_key: {}",
        encode_key_bytes(&signing_key.verifying_key().to_bytes())
    );
    Ok(ExitCode::SUCCESS)
}

fn override_token(signing_key: &Path, device: &str, valid_hours: i64) -> Result<ExitCode> {
    let max_hours = MAX_OVERRIDE_VALIDITY_SECS / 3600;
    if !(1..=max_hours).contains(&valid_hours) {
        bail!("--valid-hours must be between 1 and {}", max_hours);
    }
    let validity = Duration::hours(valid_hours);
    let device = DeviceId::new(device).context("Device identity cannot be blank")?;

    let signing_key = read_signing_key(signing_key)?;

    let claims = OverrideClaims::new(device, Utc::now(), validity);
    println!("{}", sign_override_token(&signing_key, &claims)?);
    Ok(ExitCode::SUCCESS)
}

/// Store outages are reported to the user as a retryable failure, not
/// a denial; anything else is a hard error.
fn unavailable_or(e: LicenseError) -> Result<ExitCode> {
    match e {
        LicenseError::StoreUnavailable(detail) => {
            warn!("Store unavailable: {}", detail);
            println!("An error occurred. Please try again.");
            Ok(ExitCode::from(EXIT_UNAVAILABLE))
        }
        other => Err(other.into()),
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
