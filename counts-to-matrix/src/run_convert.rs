use crate::common::*;
use crate::ingest::*;
use crate::matrix_writer::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about, term_width = 80)]
pub struct ConvertArgs {
    /// directory with featureCounts output files (`.txt` or `.txt.gz`),
    /// one per sample/cell; all files must share the gene list and row
    /// order of the first one
    #[arg(short = 'i', long = "input", required = true)]
    pub input_dir: Box<str>,

    /// output directory for `matrix.mtx`, `genes.tsv` and `samples.tsv`
    /// (default: `<input>/output`)
    #[arg(short = 'o', long = "output")]
    pub output_dir: Option<Box<str>>,

    /// abort on the first malformed record or unreadable file instead of
    /// skipping it with a warning
    #[arg(long, action = ArgAction::SetTrue)]
    pub strict: bool,

    /// also write a dense `matrix.tsv` with one row per gene
    #[arg(long, action = ArgAction::SetTrue)]
    pub dense: bool,
}

/// Aggregate all count files of the input directory into one sparse
/// gene x sample matrix and serialize it.
pub fn run_convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let output_dir: Box<str> = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => format!("{}/output", args.input_dir).into(),
    };

    let files = list_count_files(&args.input_dir)?;
    if files.is_empty() {
        return Err(anyhow::anyhow!(
            "no count files (`.txt` or `.txt.gz`) in {}",
            args.input_dir
        ));
    }
    info!("found {} count files in {}", files.len(), args.input_dir);

    let (matrix, summaries) = build_matrix(&files, args.strict)?;
    report_summaries(&summaries);

    info!(
        "assembled {} x {} matrix with {} entries",
        matrix.num_rows(),
        matrix.num_columns(),
        matrix.entries_count()
    );

    write_axis_files(&output_dir, &matrix)?;
    SparseMtxWriter::new(&output_dir, &matrix).write()?;

    if args.dense {
        DenseMatrixWriter::new(&output_dir, &matrix).write()?;
    }

    info!("wrote matrix files to {}", output_dir);
    Ok(())
}

fn report_summaries(summaries: &[FileSummary]) {
    for s in summaries {
        if s.unreadable {
            warn!("{}: unreadable, column {} left under-populated", s.sample, s.column);
        } else if s.malformed > 0 {
            warn!("{}: skipped {} malformed lines", s.sample, s.malformed);
        }
    }

    let malformed: usize = summaries.iter().map(|s| s.malformed).sum();
    let unreadable = summaries.iter().filter(|s| s.unreadable).count();

    if malformed > 0 || unreadable > 0 {
        warn!(
            "best-effort ingestion: {} malformed lines and {} unreadable files skipped",
            malformed, unreadable
        );
    }
}
