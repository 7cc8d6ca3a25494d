//! Cofre command-line client.
//!
//! Talks to a Cofre storage server: login, file upload/download, folder
//! management and user administration.

mod config;
mod progress;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cofre_client::ApiClient;
use cofre_protocol::messages::{NewUserRequest, UserUpdateRequest};
use cofre_transfer::{TransferTask, progress_channel};

use config::Config;
use progress::format_bytes;

#[derive(Parser)]
#[command(name = "cofre", version, about = "Client for the Cofre storage service")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the configured base URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        /// Account boleta
        boleta: u64,
    },

    /// End the session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// List a remote directory
    Ls {
        /// Directory to list (default: user root)
        dir: Option<String>,

        /// Show the whole tree instead of one level
        #[arg(long)]
        tree: bool,
    },

    /// Upload one or more files
    Upload {
        /// Local files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Remote destination directory ("" = user root)
        #[arg(short, long, default_value = "")]
        dest: String,
    },

    /// Download a file
    Download {
        /// Remote file path
        path: String,

        /// Local output path (default: the file's name)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Download a folder as a zip archive
    DownloadFolder {
        /// Remote folder path
        path: String,

        /// Local output path (default: <folder>.zip)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Create a remote folder
    Mkdir {
        /// Name of the new folder
        name: String,

        /// Parent directory ("" = user root)
        #[arg(long, default_value = "")]
        parent: String,
    },

    /// Move a file or folder
    Mv { source: String, dest: String },

    /// Delete a file or folder
    Rm { path: String },

    /// User administration
    #[command(subcommand)]
    Users(UserCommands),
}

#[derive(Subcommand)]
enum UserCommands {
    /// List all users
    List,

    /// Show one user
    Get { boleta: u64 },

    /// Create a user (password is prompted)
    Create {
        boleta: u64,
        email: String,
        nombre: String,
        #[arg(long)]
        role_id: Option<u64>,
    },

    /// Update a user's fields
    Update {
        boleta: u64,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        nombre: Option<String>,
        /// Change the password (prompted when the flag is present)
        #[arg(long)]
        password: bool,
        #[arg(long)]
        role_id: Option<u64>,
    },

    /// Delete a user
    Delete { boleta: u64 },

    /// Show the logged-in user's record
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
        }))
        .init();

    let mut cfg = Config::load()?;
    if let Some(url) = &cli.base_url {
        cfg.base_url = url.clone();
    }
    tracing::debug!(base_url = %cfg.base_url, "configuration loaded");

    let mut client = ApiClient::new(&cfg.base_url)?;
    if let Some(token) = config::load_token() {
        client.session_mut().set_token(token);
    }

    match cli.command {
        Commands::Login { boleta } => login(&mut client, &cfg, boleta).await?,
        Commands::Logout => logout(&mut client).await?,
        Commands::Whoami => whoami(&client).await?,
        Commands::Ls { dir, tree } => ls(&client, dir, tree).await?,
        Commands::Upload { files, dest } => upload(&client, files, dest).await?,
        Commands::Download { path, out } => download(&client, path, out).await?,
        Commands::DownloadFolder { path, out } => download_folder(&client, path, out).await?,
        Commands::Mkdir { name, parent } => {
            println!("{}", client.create_folder(&name, &parent).await?);
        }
        Commands::Mv { source, dest } => {
            println!("{}", client.move_item(&source, &dest).await?);
        }
        Commands::Rm { path } => {
            println!("{}", client.delete_item(&path).await?);
        }
        Commands::Users(cmd) => users(&client, cmd).await?,
    }

    Ok(())
}

async fn login(client: &mut ApiClient, cfg: &Config, boleta: u64) -> anyhow::Result<()> {
    let password = rpassword::prompt_password("Password: ")?;
    let resp = client.login(boleta, &password).await?;

    println!(
        "{} ({})",
        resp.message.as_deref().unwrap_or("logged in"),
        resp.user_type
    );

    if cfg.remember_session {
        if let Some(token) = client.session().token() {
            config::save_token(token)?;
        }
    }
    Ok(())
}

async fn logout(client: &mut ApiClient) -> anyhow::Result<()> {
    // The persisted token goes away even when the server is unreachable.
    config::clear_token();

    if client.session().is_authenticated() {
        match client.logout().await {
            Ok(message) => println!("{message}"),
            Err(e) => println!("session cleared locally ({e})"),
        }
    } else {
        println!("no active session");
    }
    Ok(())
}

async fn whoami(client: &ApiClient) -> anyhow::Result<()> {
    let session = client.verify_session().await?;
    if !session.authenticated {
        anyhow::bail!("session expired, log in again");
    }

    let user = client.current_user_info().await?;
    println!(
        "{} <{}> (boleta {}, {})",
        user.nombre,
        user.email,
        user.boleta,
        session.user_type.as_deref().unwrap_or("?")
    );
    Ok(())
}

async fn ls(client: &ApiClient, dir: Option<String>, tree: bool) -> anyhow::Result<()> {
    if tree {
        let tree = client.full_tree().await?;
        for (folder, listing) in &tree {
            println!("{}/", if folder.is_empty() { "." } else { folder });
            for sub in &listing.folders {
                println!("  {sub}/");
            }
            for f in &listing.files {
                println!("  {} ({:.2} MiB, {})", f.path, f.size, f.date);
            }
        }
    } else {
        let listing = client.list_dir(dir.as_deref().unwrap_or("")).await?;
        for folder in &listing.folders {
            println!("{folder}/");
        }
        for f in &listing.files {
            println!("{} ({:.2} MiB, {})", f.path, f.size, f.date);
        }
    }
    Ok(())
}

async fn upload(client: &ApiClient, files: Vec<PathBuf>, dest: String) -> anyhow::Result<()> {
    let mut tasks = Vec::with_capacity(files.len());
    for file in &files {
        let task = TransferTask::new(file, dest.clone())
            .with_context(|| format!("cannot upload {}", file.display()))?;
        tasks.push(task);
    }

    let (sender, rx) = progress_channel(64);
    let renderer = tokio::spawn(progress::render(rx));

    if let [task] = tasks.as_slice() {
        let result = client.upload_file(task, &sender).await;
        drop(sender);
        let _ = renderer.await;

        let outcome = result?;
        println!("{}: {}", outcome.file, outcome.message);
        if let Some(stored) = outcome.stored_as {
            println!("stored remotely as {stored}");
        }
        return Ok(());
    }

    let outcomes = client.upload_files(&tasks, &sender).await;
    drop(sender);
    let _ = renderer.await;

    let mut failed = 0;
    for item in outcomes {
        match item.result {
            Ok(outcome) => println!("{}: {}", outcome.file, outcome.message),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", item.file);
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed", files.len());
    }
    Ok(())
}

async fn download(client: &ApiClient, path: String, out: Option<PathBuf>) -> anyhow::Result<()> {
    let bytes = client.download_file(&path).await?;

    let name = path.rsplit('/').next().unwrap_or(&path);
    let out = out.unwrap_or_else(|| PathBuf::from(name));
    tokio::fs::write(&out, &bytes)
        .await
        .with_context(|| format!("cannot write {}", out.display()))?;

    println!("{} ({})", out.display(), format_bytes(bytes.len() as u64));
    Ok(())
}

async fn download_folder(
    client: &ApiClient,
    path: String,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let bytes = client.download_folder(&path).await?;

    let name = path.rsplit('/').next().unwrap_or(&path);
    let out = out.unwrap_or_else(|| PathBuf::from(format!("{name}.zip")));
    tokio::fs::write(&out, &bytes)
        .await
        .with_context(|| format!("cannot write {}", out.display()))?;

    println!("{} ({})", out.display(), format_bytes(bytes.len() as u64));
    Ok(())
}

async fn users(client: &ApiClient, cmd: UserCommands) -> anyhow::Result<()> {
    match cmd {
        UserCommands::List => {
            for user in client.list_users().await? {
                println!("{}\t{}\t{}", user.boleta, user.nombre, user.email);
            }
        }
        UserCommands::Get { boleta } => {
            let user = client.get_user(boleta).await?;
            println!("{} <{}> (boleta {})", user.nombre, user.email, user.boleta);
        }
        UserCommands::Create {
            boleta,
            email,
            nombre,
            role_id,
        } => {
            let password = rpassword::prompt_password("New user password: ")?;
            let req = NewUserRequest {
                boleta,
                email,
                password,
                nombre,
                role_id,
            };
            println!("{}", client.create_user(&req).await?);
        }
        UserCommands::Update {
            boleta,
            email,
            nombre,
            password,
            role_id,
        } => {
            let password = if password {
                Some(rpassword::prompt_password("New password: ")?)
            } else {
                None
            };
            let changes = UserUpdateRequest {
                email,
                nombre,
                password,
                role_id,
            };
            println!("{}", client.update_user(boleta, &changes).await?);
        }
        UserCommands::Delete { boleta } => {
            println!("{}", client.delete_user(boleta).await?);
        }
        UserCommands::Info => {
            let user = client.current_user_info().await?;
            println!("{} <{}> (boleta {})", user.nombre, user.email, user.boleta);
        }
    }
    Ok(())
}
