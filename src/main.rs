//! seqcat - Supermatrix concatenation tool
//!
//! Merges per-gene sequence alignments into one taxon-aligned
//! supermatrix and writes the merged alignment together with a
//! partition map locating each gene.
//!
//! ## Usage
//!
//! ```bash
//! seqcat gene1.fasta gene2.nex gene3.gb -o supermatrix
//! seqcat -f fasta genes/*.txt -o supermatrix --nexus
//! seqcat gene1.fasta gene2.fasta --view   # inspect without writing
//! ```
//!
//! ## Supported Formats
//!
//! - FASTA (.fasta, .fa, .fna, .faa, .fas)
//! - NEXUS (.nex, .nexus, .nxs)
//! - GenBank (.gb, .gbk, .gbff, .genbank)
//!
//! ## Outputs
//!
//! - `<BASE>.fasta`: the merged supermatrix
//! - `<BASE>_partition.txt`: CHARSET lines per gene, with codon positions
//! - `<BASE>.nex`: NEXUS rendition with the charsets (with `--nexus`)

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use seqcat::controller::run_viewer;
use seqcat::formats::fasta::write_fasta;
use seqcat::formats::nexus::write_nexus;
use seqcat::formats::{read_collection_with_options, write_partition_file, FileFormat};
use seqcat::merge::merge;
use seqcat::model::Supermatrix;
use seqcat::partition::charset_text;

/// File format selection for the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// FASTA format
    Fasta,
    /// NEXUS format
    Nexus,
    /// GenBank format
    Genbank,
    /// Auto-detect from extension and content
    Auto,
}

impl From<FormatArg> for Option<FileFormat> {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Fasta => Some(FileFormat::Fasta),
            FormatArg::Nexus => Some(FileFormat::Nexus),
            FormatArg::Genbank => Some(FileFormat::Genbank),
            FormatArg::Auto => None,
        }
    }
}

/// seqcat - Concatenate per-gene alignments into a partitioned supermatrix
///
/// Each input file holds the alignment of one gene. Taxa are matched by
/// name across files; taxa absent from a gene are padded with a filler
/// character. Writes the merged alignment plus a partition map, and can
/// open the result in an interactive viewer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Per-gene alignment files, in concatenation order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Force a specific input format for all files (overrides auto-detection)
    #[arg(short = 'f', long = "format", value_enum, default_value = "auto")]
    format: FormatArg,

    /// Output base path; writes <BASE>.fasta and <BASE>_partition.txt
    #[arg(short = 'o', long = "out", required_unless_present = "view")]
    out: Option<PathBuf>,

    /// Filler character for taxa absent from a gene
    #[arg(short = 'm', long = "missing", default_value_t = '?')]
    missing: char,

    /// Also write <BASE>.nex with the partitions as charsets
    #[arg(long = "nexus")]
    nexus: bool,

    /// Open the merged supermatrix in the interactive viewer
    #[arg(long = "view")]
    view: bool,
}

/// Appends a suffix to a base path without touching its extension logic.
fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut path = base.as_os_str().to_os_string();
    path.push(suffix);
    PathBuf::from(path)
}

/// Prints the post-merge summary to stdout.
fn print_summary(matrix: &Supermatrix) {
    let stats = matrix.stats();

    println!();
    println!("Alignment summary:");
    println!("  Taxa:    {}", stats.num_taxa);
    println!("  Length:  {} bp", stats.alignment_length);
    println!(
        "  Missing: {} ({:.2}%)",
        stats.missing_count, stats.missing_percent
    );
    println!("  Partitions:");
    for partition in &matrix.partitions {
        println!(
            "    {} = {}-{}",
            partition.label, partition.start, partition.end
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let forced_format: Option<FileFormat> = args.format.into();

    if !args.missing.is_ascii() || args.missing.is_whitespace() {
        anyhow::bail!(
            "Filler must be a non-whitespace ASCII character (got {:?})",
            args.missing
        );
    }

    let mut collections = Vec::with_capacity(args.files.len());
    for path in &args.files {
        println!("Reading: {}", path.display());
        let collection = read_collection_with_options(path, forced_format)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        collections.push(collection);
    }

    let matrix = match merge(&collections, args.missing) {
        Ok(matrix) => matrix,
        Err(err) => {
            let source = args.files[err.gene() - 1].display().to_string();
            return Err(anyhow::Error::new(err).context(format!("Failed to merge {}", source)));
        }
    };

    if let Some(base) = &args.out {
        let charsets = charset_text(&matrix.partitions, true);

        let fasta_path = with_suffix(base, ".fasta");
        write_fasta(&fasta_path, &matrix.sequences)
            .with_context(|| format!("Failed to write {}", fasta_path.display()))?;
        println!("Wrote alignment: {}", fasta_path.display());

        let partition_path = with_suffix(base, "_partition.txt");
        write_partition_file(&partition_path, &charsets)
            .with_context(|| format!("Failed to write {}", partition_path.display()))?;
        println!("Wrote partitions: {}", partition_path.display());

        if args.nexus {
            let nexus_path = with_suffix(base, ".nex");
            write_nexus(&nexus_path, &matrix, Some(&charsets))
                .with_context(|| format!("Failed to write {}", nexus_path.display()))?;
            println!("Wrote NEXUS: {}", nexus_path.display());
        }
    }

    print_summary(&matrix);

    if args.view {
        run_viewer(matrix)?;
    }

    Ok(())
}
