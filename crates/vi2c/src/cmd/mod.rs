use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod doctor;
pub mod envinfo;
pub mod probe;
pub mod read;
pub mod version;
pub mod write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a pattern, reopen the device, and read back what it returns.
    Probe(ProbeArgs),
    /// Write a pattern (or raw data) to the device.
    Write(WriteArgs),
    /// Read from the device.
    Read(ReadArgs),
    /// Check that the device node is present and usable.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, device: &Path, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Probe(args) => probe::run(args, device, format),
        Command::Write(args) => write::run(args, device, format),
        Command::Read(args) => read::run(args, device, format),
        Command::Doctor(args) => doctor::run(args, device, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, device, format),
    }
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Hex bytes written on each write (e.g. "01,02,03" or "0x01 0x02").
    #[arg(long, default_value = "01,02,03")]
    pub pattern: String,
    /// Number of separate writes of the pattern.
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,
    /// Maximum number of bytes to read back.
    #[arg(long, default_value = "1024", value_parser = clap::value_parser!(u32).range(1..))]
    pub read_len: u32,
    /// Run against a fresh in-memory loopback instead of the device.
    #[arg(long)]
    pub loopback: bool,
    /// Exit with status 1 unless the read-back starts with what was written.
    #[arg(long)]
    pub expect_echo: bool,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Hex bytes to write.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub pattern: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["pattern", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["pattern", "data"])]
    pub file: Option<PathBuf>,
    /// Number of separate writes of the payload.
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Maximum number of bytes to read.
    #[arg(long, default_value = "1024", value_parser = clap::value_parser!(u32).range(1..))]
    pub read_len: u32,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}
