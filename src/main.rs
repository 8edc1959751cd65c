use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use vusf::{
    decode_with, extract_line_bytes, list, scan_with, ContainerHeader, DecodeError, DecodeOptions,
    ExtractError, ListOptions, ScanOptions, SF_MAX_SECTION_SIZE,
};

/// Assignment variant number reported by `vusf variant`.
const VARIANT: u32 = 85506;

#[derive(Parser)]
#[command(name = "vusf", about = "Inspect \"Vu\" section containers and find SF files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the variant number
    Variant,
    /// Decode a container header and print its section table
    Parse {
        #[arg(short, long)]
        path: PathBuf,
        /// Reject headers whose header_size disagrees with the section count
        #[arg(long)]
        strict: bool,
        /// Print the decoded header as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one line of a section, reversed
    Extract {
        #[arg(short, long)]
        path: PathBuf,
        /// 1-based section number
        #[arg(short, long)]
        section: usize,
        /// 1-based line number
        #[arg(short, long)]
        line: usize,
    },
    /// Recursively list SF files (containers whose sections are all small)
    Findall {
        #[arg(short, long)]
        path: PathBuf,
        #[arg(long, default_value_t = SF_MAX_SECTION_SIZE)]
        max_section_size: u32,
    },
    /// List directory contents
    List {
        #[arg(short, long)]
        path: PathBuf,
        #[arg(short, long)]
        recursive: bool,
        /// Only entries the owner can write
        #[arg(long)]
        has_perm_write: bool,
        #[arg(long)]
        name_starts_with: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match Cli::parse().command {

        // ── Variant ──────────────────────────────────────────────────────────
        Commands::Variant => {
            writeln!(out, "{VARIANT}")?;
        }

        // ── Parse ────────────────────────────────────────────────────────────
        Commands::Parse { path, strict, json } => {
            let opts = DecodeOptions { verify_header_size: strict };
            match decode_with(&path, &opts) {
                Ok(header) if json => {
                    writeln!(out, "SUCCESS")?;
                    serde_json::to_writer_pretty(&mut out, &header)?;
                    writeln!(out)?;
                }
                Ok(header) => {
                    writeln!(out, "SUCCESS")?;
                    write_header(&mut out, &header)?;
                }
                Err(e) => {
                    log::debug!("parse {}: {e}", path.display());
                    writeln!(out, "ERROR\n{}", decode_message(&e))?;
                }
            }
        }

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { path, section, line } => {
            match extract_line_bytes(&path, section, line) {
                Ok(bytes) => {
                    writeln!(out, "SUCCESS")?;
                    out.write_all(&bytes)?;
                    writeln!(out)?;
                }
                Err(e) => {
                    log::debug!("extract {}: {e}", path.display());
                    writeln!(out, "ERROR\n{}", extract_message(&e))?;
                }
            }
        }

        // ── Findall ──────────────────────────────────────────────────────────
        Commands::Findall { path, max_section_size } => {
            let opts = ScanOptions { max_section_size, ..Default::default() };
            match scan_with(&path, opts) {
                Ok(files) => {
                    writeln!(out, "SUCCESS")?;
                    for file in files {
                        writeln!(out, "{}", file.display())?;
                    }
                }
                Err(e) => {
                    log::debug!("{e}");
                    writeln!(out, "ERROR\ninvalid directory path")?;
                }
            }
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { path, recursive, has_perm_write, name_starts_with } => {
            let opts = ListOptions {
                recursive,
                writable_only: has_perm_write,
                name_prefix:   name_starts_with,
            };
            match list(&path, opts) {
                Ok(entries) => {
                    writeln!(out, "SUCCESS")?;
                    for entry in entries {
                        writeln!(out, "{}", entry.display())?;
                    }
                }
                Err(e) => {
                    log::debug!("{e}");
                    writeln!(out, "ERROR\ninvalid directory path")?;
                }
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn write_header<W: Write>(out: &mut W, header: &ContainerHeader) -> io::Result<()> {
    writeln!(out, "version={}", header.version())?;
    writeln!(out, "nr_sections={}", header.sections().len())?;
    for (i, s) in header.sections().iter().enumerate() {
        writeln!(out, "section{}: {} {} {}", i + 1, s.name, s.section_type, s.size)?;
    }
    Ok(())
}

fn decode_message(e: &DecodeError) -> &'static str {
    match e {
        DecodeError::InvalidPath(_) | DecodeError::Io(_) => "wrong path",
        DecodeError::BadMagic(_)                         => "wrong magic",
        DecodeError::BadVersion(_)                       => "wrong version",
        DecodeError::BadSectionCount(_)                  => "wrong sect_nr",
        DecodeError::InconsistentHeaderSize { .. }       => "wrong header_size",
        DecodeError::BadSectionType { .. }               => "wrong sect_types",
    }
}

fn extract_message(e: &ExtractError) -> &'static str {
    match e {
        ExtractError::File(_) | ExtractError::Io(_) => "invalid file",
        ExtractError::Section { .. }                => "invalid section",
        ExtractError::Line { .. }                   => "invalid line",
    }
}
