//! CLI entry point for phoenix-shell
//!
//! Provides command-line access to the frontend settings file, core
//! metadata, the content browser and the installed core library.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use colored::*;
use phoenix_shell::browser::{BrowseOptions, BrowseSession, EntryKind, PathList, StdFileSystem};
use phoenix_shell::config::{AudioHints, ConfigFile, ConfigManager, Settings};
use phoenix_shell::core::{libretro_name, CoreInfo, FirmwareStatus};
use phoenix_shell::library::{CoreLibrary, CoreSort};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing_subscriber::EnvFilter;

/// Settings backups kept after each write
const KEEP_BACKUPS: usize = 10;

#[derive(Parser)]
#[command(name = "phoenix-shell")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Frontend data directory (cores/, info/, retroarch.cfg)
    #[arg(long, global = true, default_value = "~/.local/share/phoenix")]
    data_dir: PathBuf,

    /// Frontend preference file [default: <data-dir>/settings.json]
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read or edit retroarch.cfg
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show a core's metadata and firmware status
    Info {
        /// Core file, file name in the cores directory, or libretro name
        core: String,
    },

    /// List installed cores
    Cores {
        /// Sort by core title instead of system title
        #[arg(long)]
        by_core: bool,
    },

    /// List a directory the way the content browser shows it
    Browse {
        dir: PathBuf,

        /// Allowed file extensions (comma separated)
        #[arg(long = "ext", value_delimiter = ',')]
        extensions: Vec<String>,

        /// Directory selection mode
        #[arg(long)]
        dirs: bool,

        /// Name table mapping file names to titles
        #[arg(long)]
        titles: Option<PathBuf>,
    },

    /// Show a prepared list of content paths, one per line
    List {
        file: PathBuf,

        /// Name table mapping archive names to titles
        #[arg(long)]
        titles: Option<PathBuf>,
    },

    /// Back up an installed core into a zip archive
    Backup {
        core: String,

        /// Backup directory [default: from settings]
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// List core backups in a directory
    Backups {
        /// Backup directory [default: from settings]
        dir: Option<PathBuf>,
    },

    /// Install a core from a .so or .zip backup
    Install { file: PathBuf },

    /// Uninstall a core
    Remove { core: String },

    /// Remove a core's settings keys and config directory
    Purge {
        core: String,

        /// Only delete the core's .opt files
        #[arg(long)]
        options_only: bool,
    },

    /// Apply frontend settings to retroarch.cfg
    Sync {
        /// Copy values back from retroarch.cfg into the settings instead
        #[arg(long)]
        pull: bool,

        /// Output sample rate reported by the audio device
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Audio buffer size in frames
        #[arg(long)]
        block_frames: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print one value
    Get { key: String },

    /// Set one value
    Set { key: String, value: String },

    /// Remove every key starting with a prefix
    UnsetPrefix { prefix: String },

    /// Print every entry
    Dump,
}

/// Resolved locations under the data directory
struct Paths {
    retroarch_cfg: PathBuf,
    settings: PathBuf,
    cores_dir: PathBuf,
    info_dir: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path, settings: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = expand(data_dir)?;
        let settings = match settings {
            Some(path) => expand(path)?,
            None => data_dir.join("settings.json"),
        };

        Ok(Self {
            retroarch_cfg: data_dir.join("retroarch.cfg"),
            settings,
            cores_dir: data_dir.join("cores"),
            info_dir: data_dir.join("info"),
        })
    }

    fn library(&self) -> CoreLibrary {
        CoreLibrary::new(self.cores_dir.clone(), self.info_dir.clone())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let paths = Paths::new(&cli.data_dir, cli.settings.as_deref())?;

    match cli.command {
        Commands::Config { action } => config_command(&paths, action)?,
        Commands::Info { core } => show_info(&paths, &core)?,
        Commands::Cores { by_core } => list_cores(&paths, by_core)?,
        Commands::Browse {
            dir,
            extensions,
            dirs,
            titles,
        } => browse(&dir, &extensions, dirs, titles.as_deref())?,
        Commands::List { file, titles } => show_path_list(&file, titles.as_deref())?,
        Commands::Backup { core, dest } => backup(&paths, &core, dest.as_deref())?,
        Commands::Backups { dir } => list_backups(&paths, dir.as_deref())?,
        Commands::Install { file } => install(&paths, &file)?,
        Commands::Remove { core } => {
            let core = resolve_core(&paths, &core)?;
            paths.library().remove_core(&core)?;
            println!("{} Removed {}", "✓".green(), core.display());
        }
        Commands::Purge { core, options_only } => purge(&paths, &core, options_only)?,
        Commands::Sync {
            pull,
            sample_rate,
            block_frames,
        } => sync(
            &paths,
            pull,
            AudioHints {
                sample_rate,
                block_frames,
            },
        )?,
    }

    Ok(())
}

/// Expands a leading `~` in a path
fn expand(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| anyhow!("Invalid path encoding: {}", path.display()))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

/// Finds a core by name or path.
///
/// Bare names are looked up in the cores directory, first as a file name and
/// then as a libretro name (`snes9x`). Only arguments with a path separator
/// or a leading `~` are taken as paths.
fn resolve_core(paths: &Paths, core: &str) -> anyhow::Result<PathBuf> {
    let is_path = core.starts_with('~') || core.contains('/') || core.contains(MAIN_SEPARATOR);
    if is_path {
        let path = expand(Path::new(core))?;
        if !path.is_file() {
            bail!("No core file at {}", path.display());
        }
        return Ok(path);
    }

    let in_cores = paths.cores_dir.join(core);
    if in_cores.is_file() {
        return Ok(in_cores);
    }

    paths
        .library()
        .installed_cores(CoreSort::ByCore)?
        .into_iter()
        .find(|installed| installed.libretro_name() == core)
        .map(|installed| installed.path)
        .ok_or_else(|| anyhow!("No installed core matches '{}'", core))
}

fn load_settings(paths: &Paths) -> anyhow::Result<Settings> {
    Settings::load(&paths.settings)
        .with_context(|| format!("Failed to load settings: {}", paths.settings.display()))
}

/// Commits `config` through a backup transaction, then prunes old backups
fn commit_config(manager: &ConfigManager, config: &ConfigFile) -> anyhow::Result<()> {
    manager.begin_transaction()?.commit(config)?;
    manager.cleanup_old_backups(KEEP_BACKUPS)?;
    Ok(())
}

fn config_command(paths: &Paths, action: ConfigAction) -> anyhow::Result<()> {
    let manager = ConfigManager::new(paths.retroarch_cfg.clone())?;
    let mut config = manager.load()?;

    match action {
        ConfigAction::Get { key } => match config.get_string(&key) {
            Some(value) => println!("{}", value),
            None => bail!("Key not set: {}", key),
        },
        ConfigAction::Set { key, value } => {
            config.set_string(key.as_str(), value.as_str());
            commit_config(&manager, &config)?;
            println!("{} {} = \"{}\"", "✓".green(), key.cyan(), value);
        }
        ConfigAction::UnsetPrefix { prefix } => {
            let removed = config.remove_keys_with_prefix(&prefix);
            if removed > 0 {
                commit_config(&manager, &config)?;
            }
            println!(
                "{} Removed {} key{}",
                "✓".green(),
                removed,
                if removed == 1 { "" } else { "s" }
            );
        }
        ConfigAction::Dump => {
            println!("{}", format!("Settings from: {}\n", manager.config_path().display()).bold());
            for (key, value) in config.iter() {
                println!("{} = \"{}\"", key.cyan(), value);
            }
            for warning in config.warnings() {
                println!("{} {}", "⚠".yellow(), warning);
            }
        }
    }

    Ok(())
}

fn show_info(paths: &Paths, core: &str) -> anyhow::Result<()> {
    let core = resolve_core(paths, core)?;
    let Some(info) = CoreInfo::load(&paths.info_dir, &core)? else {
        println!("{} No .info file for {}", "⚠".yellow(), core.display());
        return Ok(());
    };
    let settings = load_settings(paths)?;

    println!("{}", info.core_title().cyan().bold());
    println!("  {:<14} {}", "System:".dimmed(), info.system_title());
    println!("  {:<14} {}", "Manufacturer:".dimmed(), info.manufacturer.display_or(", ", "N/A"));
    println!("  {:<14} {}", "Authors:".dimmed(), info.authors.display_or(", ", "N/A"));
    println!("  {:<14} {}", "License:".dimmed(), info.license.display_or(", ", "N/A"));
    println!(
        "  {:<14} {}",
        "Extensions:".dimmed(),
        info.supported_extensions.display_or(", ", "N/A")
    );
    if !info.required_hw_api.is_empty() {
        println!("  {:<14} {}", "Graphics API:".dimmed(), info.required_hw_api.display_or(", ", ""));
    }
    if !info.permissions.is_empty() {
        println!("  {:<14} {}", "Permissions:".dimmed(), info.permissions.display_or(", ", ""));
    }
    if let Some(description) = &info.description {
        println!("\n{}", description);
    }
    if let Some(notes) = info.notes_text() {
        println!("\n{}\n{}", "Notes".bold(), notes);
    }

    if !info.firmware.is_empty() {
        let system_dir = settings.system_dir();
        println!("\n{} ({})", "Firmware".bold(), system_dir.display());

        for (firmware, status) in info.firmware_report(&system_dir) {
            let marker = match status {
                FirmwareStatus::Present => status.marker().to_string().green(),
                FirmwareStatus::MissingOptional => status.marker().to_string().yellow(),
                FirmwareStatus::MissingRequired => status.marker().to_string().red(),
            };
            println!(
                "  {} {} {}",
                marker,
                firmware.path.as_deref().unwrap_or("?"),
                firmware.description.as_deref().unwrap_or("N/A").dimmed()
            );
        }
    }

    Ok(())
}

fn list_cores(paths: &Paths, by_core: bool) -> anyhow::Result<()> {
    let sort = if by_core {
        CoreSort::ByCore
    } else {
        CoreSort::from_flag(load_settings(paths)?.sort_cores_by_system)
    };
    let cores = paths.library().installed_cores(sort)?;

    for core in &cores {
        let (first, second) = match sort {
            CoreSort::ByCore => (&core.core_title, &core.system_title),
            CoreSort::BySystem => (&core.system_title, &core.core_title),
        };
        println!("{} {} {}", first.cyan().bold(), "─".dimmed(), second);
    }

    println!("\n{} Total: {} cores", "✓".green(), cores.len());
    Ok(())
}

fn browse(
    dir: &Path,
    extensions: &[String],
    dirs: bool,
    titles: Option<&Path>,
) -> anyhow::Result<()> {
    let dir = expand(dir)?;
    let mut options = BrowseOptions::new()
        .with_extensions(extensions)
        .directory_target(dirs);
    if let Some(titles) = titles {
        options = options.with_name_map(ConfigFile::load(expand(titles)?)?);
    }

    let session = BrowseSession::open(StdFileSystem::new(), Some(&dir), options)?;

    println!("{}", format!("{}\n", session.current_dir().display()).bold());
    for (index, entry) in session.entries().iter().enumerate() {
        let name = match entry.kind() {
            EntryKind::UseThisDirectory | EntryKind::Parent => entry.display_name().magenta(),
            EntryKind::Directory => format!("{}/", entry.display_name()).cyan(),
            EntryKind::File => entry.display_name().normal(),
        };
        let name = if entry.is_enabled() { name } else { name.dimmed() };
        println!("{:>4}  {}", index.to_string().dimmed(), name);
    }

    Ok(())
}

fn show_path_list(file: &Path, titles: Option<&Path>) -> anyhow::Result<()> {
    let titles = match titles {
        Some(titles) => Some(ConfigFile::load(expand(titles)?)?),
        None => None,
    };
    let list = PathList::load(expand(file)?, titles.as_ref())?;

    for (index, entry) in list.entries().iter().enumerate() {
        println!("{:>4}  {}", index.to_string().dimmed(), entry.display_name());
    }

    println!("\n{} {} entries", "✓".green(), list.entries().len());
    Ok(())
}

fn backup(paths: &Paths, core: &str, dest: Option<&Path>) -> anyhow::Result<()> {
    let core = resolve_core(paths, core)?;
    let dest = match dest {
        Some(dest) => expand(dest)?,
        None => load_settings(paths)?.backup_cores_dir(),
    };

    let archive = paths.library().backup_core(&core, &dest, |_| {})?;
    println!("{} Backed up to {}", "✓".green(), archive.display());
    Ok(())
}

fn list_backups(paths: &Paths, dir: Option<&Path>) -> anyhow::Result<()> {
    let dir = match dir {
        Some(dir) => expand(dir)?,
        None => load_settings(paths)?.backup_cores_dir(),
    };

    let backups = paths.library().local_backups(&dir)?;
    for backup in &backups {
        let name = backup
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let info = match &backup.info_path {
            Some(_) => "info".green(),
            None => "no info".yellow(),
        };
        println!("{} [{}]", name.cyan(), info);
    }

    println!("\n{} {} backups in {}", "✓".green(), backups.len(), dir.display());
    Ok(())
}

fn install(paths: &Paths, file: &Path) -> anyhow::Result<()> {
    let file = expand(file)?;
    let core = paths.library().install_backup(&file, |_| {})?;
    println!("{} Installed {}", "✓".green(), core.display());
    Ok(())
}

fn purge(paths: &Paths, core: &str, options_only: bool) -> anyhow::Result<()> {
    let core = resolve_core(paths, core)?;
    let config_dir = load_settings(paths)?.config_dir();
    let library = paths.library();
    let name = core
        .file_name()
        .map(|n| libretro_name(&n.to_string_lossy()).to_string())
        .unwrap_or_default();

    if options_only {
        let removed = library.reset_core_options(&core, &config_dir)?;
        println!("{} Deleted {} option file(s) for {}", "✓".green(), removed, name.cyan());
        return Ok(());
    }

    let report = library.purge_core_settings(&core, &paths.retroarch_cfg, &config_dir)?;
    println!(
        "{} Purged {}: {} key(s){}",
        "✓".green(),
        name.cyan(),
        report.keys_removed,
        if report.config_dir_removed {
            ", config directory"
        } else {
            ""
        }
    );
    Ok(())
}

fn sync(paths: &Paths, pull: bool, audio: AudioHints) -> anyhow::Result<()> {
    let mut settings = load_settings(paths)?;
    let manager = ConfigManager::new(paths.retroarch_cfg.clone())?;
    let mut config = manager.load()?;

    if pull {
        settings.read_back(&config)?;
        settings.save(&paths.settings)?;
        println!("{} Updated {}", "✓".green(), paths.settings.display());
        return Ok(());
    }

    settings
        .ensure_directories()
        .context("Failed to create frontend directories")?;
    settings.apply_to(&mut config, audio);
    commit_config(&manager, &config)?;

    println!("{} Wrote {}", "✓".green(), manager.config_path().display());
    Ok(())
}
