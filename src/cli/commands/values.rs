//! Values command - Inspect, convert and reset learned value files

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};

use crate::{
    adapters::{CsvRepository, MsgPackRepository},
    cli::output::{print_kv, print_section, print_snapshot},
    ports::ValueRepository,
    value_store::{SnapshotKind, ValueSnapshot},
};

#[derive(Parser, Debug)]
#[command(about = "Inspect, convert and reset learned value files")]
pub struct ValuesArgs {
    #[command(subcommand)]
    pub command: ValuesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ValuesCommand {
    /// Print the records of a value file
    Show {
        path: PathBuf,

        /// Record layout of the file
        #[arg(long, short = 'k', value_enum, default_value = "table")]
        kind: KindArg,

        /// Maximum rows printed
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: usize,
    },

    /// Convert a value file between CSV and MessagePack
    Convert {
        input: PathBuf,

        output: PathBuf,

        #[arg(long, short = 'k', value_enum, default_value = "table")]
        kind: KindArg,
    },

    /// Overwrite a value file with the default records
    Reset {
        path: PathBuf,

        #[arg(long, short = 'k', value_enum, default_value = "table")]
        kind: KindArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Monte-Carlo and Q-Learning state/action values
    Table,
    /// Perceptron unit weights
    Perceptron,
}

impl From<KindArg> for SnapshotKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Table => SnapshotKind::Table,
            KindArg::Perceptron => SnapshotKind::Perceptron,
        }
    }
}

/// Pick the repository from the file extension.
pub(crate) fn repository_for(path: &Path) -> Result<Box<dyn ValueRepository>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => Ok(Box::new(CsvRepository::new())),
        Some("msgpack" | "mpk") => Ok(Box::new(MsgPackRepository::new())),
        _ => Err(anyhow!(
            "unsupported value file '{}' (expected .csv, .msgpack or .mpk)",
            path.display()
        )),
    }
}

pub(crate) fn convert(input: &Path, output: &Path, kind: SnapshotKind) -> Result<ValueSnapshot> {
    let snapshot = repository_for(input)?.load(kind, input)?;
    repository_for(output)?.save(&snapshot, output)?;
    Ok(snapshot)
}

pub fn execute(args: ValuesArgs) -> Result<()> {
    match args.command {
        ValuesCommand::Show { path, kind, limit } => {
            let snapshot = repository_for(&path)?.load(kind.into(), &path)?;
            print_section(&format!("Values: {}", path.display()));
            print_kv("Kind", snapshot.kind().as_str());
            print_kv("Records", &snapshot.len().to_string());
            println!();
            print_snapshot(&snapshot, limit);
        }
        ValuesCommand::Convert {
            input,
            output,
            kind,
        } => {
            let snapshot = convert(&input, &output, kind.into())?;
            println!(
                "Converted {} records: {} -> {}",
                snapshot.len(),
                input.display(),
                output.display()
            );
        }
        ValuesCommand::Reset { path, kind } => {
            let snapshot = ValueSnapshot::default_for(kind.into());
            repository_for(&path)?.save(&snapshot, &path)?;
            println!("Reset {} to {} default records", path.display(), snapshot.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        types::{Direction, State},
        value_store::ValueRecord,
    };

    #[test]
    fn test_repository_for_extension() {
        assert!(repository_for(Path::new("Q-Learning.csv")).is_ok());
        assert!(repository_for(Path::new("values.MSGPACK")).is_ok());
        assert!(repository_for(Path::new("values.txt")).is_err());
        assert!(repository_for(Path::new("values")).is_err());
    }

    #[test]
    fn test_convert_csv_to_msgpack() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let csv_path = temp_dir.path().join("Q-Learning.csv");
        let mpk_path = temp_dir.path().join("Q-Learning.msgpack");

        let snapshot = ValueSnapshot::Table(vec![ValueRecord::new(
            State::from_differences(1, -1, 0, 0),
            Direction::Up,
            1.25,
        )]);
        CsvRepository::new().save(&snapshot, &csv_path).unwrap();

        convert(&csv_path, &mpk_path, SnapshotKind::Table).unwrap();
        let loaded = MsgPackRepository::new()
            .load(SnapshotKind::Table, &mpk_path)
            .unwrap();
        assert_eq!(loaded, snapshot);
    }
}
