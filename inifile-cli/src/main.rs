use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Builder as LoggerBuilder;
use inifile::models::{IniEntry, SectionId};
use inifile::{Encoding, IniLoader, IniWriter, LoadOptions, WriteMode, WriteOptions};
use log::LevelFilter;

#[derive(Debug, Clone, ValueEnum)]
enum Verbosity {
    Warnings,
    Silent,
    Debug,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FileEncoding {
    Utf8,
    Utf16le,
    Utf16be,
}

impl From<FileEncoding> for Encoding {
    fn from(encoding: FileEncoding) -> Self {
        match encoding {
            FileEncoding::Utf8 => Encoding::Utf8,
            FileEncoding::Utf16le => Encoding::Utf16Le,
            FileEncoding::Utf16be => Encoding::Utf16Be,
        }
    }
}

/// Simple cli tool to read and edit .ini files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path of the .ini file
    #[arg(short, long)]
    path: PathBuf,

    /// Character encoding of the file
    #[arg(short, long, value_enum, default_value_t = FileEncoding::Utf8)]
    encoding: FileEncoding,

    #[arg(short, long, value_enum, default_value_t = Verbosity::Warnings)]
    verbosity: Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value of a key
    Get {
        /// Section name. Leave empty for global section.
        #[arg(short, long)]
        section: Option<String>,

        key: String,
    },
    /// Print all entries, or those of one section
    List {
        /// Section name. Leave empty to list the whole file.
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Add a key or replace its value
    Set {
        /// Section name. Leave empty for global section.
        #[arg(short, long)]
        section: Option<String>,

        /// Comment written above the key
        #[arg(short, long)]
        comment: Option<String>,

        key: String,

        value: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.verbosity {
        Verbosity::Silent => (),
        Verbosity::Warnings => LoggerBuilder::new().filter(None, LevelFilter::Warn).init(),
        Verbosity::Debug => LoggerBuilder::new().filter(None, LevelFilter::Debug).init(),
    }

    if args.path.extension().is_none_or(|extension| extension != "ini") {
        log::warn!("Specified file does not have an .ini extension!");
    }

    let encoding = Encoding::from(args.encoding);

    match args.command {
        Command::Get { section, key } => {
            let loader = load(&args.path, encoding)?;
            let section = section.as_deref();

            if !loader.contains_section(section)? {
                return Err(anyhow!("The given ini file did not contain the specified section"));
            }

            match loader.value(section, &key)? {
                Some(value) => print!("{value}"),
                None => return Err(anyhow!("The given section did not contain the specified key")),
            }
        }
        Command::List { section: None } => {
            let loader = load(&args.path, encoding)?;

            for entry in loader.all_entries()? {
                println!("{}", describe(entry));
            }
        }
        Command::List { section: Some(name) } => {
            let loader = load(&args.path, encoding)?;

            let Some(entries) = loader.section_entries(Some(name.as_str()))? else {
                return Err(anyhow!("The given ini file did not contain the specified section"));
            };

            for entry in entries {
                println!("{}", describe(entry));
            }
        }
        Command::Set {
            section,
            comment,
            key,
            value,
        } => {
            let mut entry = IniEntry::new(section.as_deref(), key, value);
            if let Some(comment) = comment {
                entry = entry.with_comment(comment);
            }
            set(&args.path, encoding, entry)?;
        }
    }

    Ok(())
}

fn load(path: &Path, encoding: Encoding) -> anyhow::Result<IniLoader> {
    let mut loader = IniLoader::new();
    loader
        .load_with(path, LoadOptions::default().with_encoding(encoding))
        .with_context(|| format!("Could not load {}", path.display()))?;
    Ok(loader)
}

/// Rewrites the file with `entry` replacing any entry under the same section and key.
fn set(path: &Path, encoding: Encoding, entry: IniEntry) -> anyhow::Result<()> {
    let mut writer = IniWriter::new();

    if path.exists() {
        let loader = load(path, encoding)?;
        writer.add_all(
            loader
                .all_entries()?
                .into_iter()
                .filter(|existing| existing.section() != entry.section() || existing.key() != entry.key())
                .cloned(),
        );
    }

    writer.add(entry);
    writer
        .write_with(path, WriteOptions::default().with_encoding(encoding).with_mode(WriteMode::New))
        .with_context(|| format!("Could not write {}", path.display()))?;

    Ok(())
}

fn describe(entry: &IniEntry) -> String {
    match entry.section() {
        SectionId::Global => entry.to_string(),
        SectionId::Named(name) => format!("{name}.{entry}"),
    }
}
