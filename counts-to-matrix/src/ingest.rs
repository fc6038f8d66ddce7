//! Parallel population of the expression matrix, one task per count file

use crate::common::*;
use crate::count_file::*;
use crate::sparse_matrix::SparseExpressionMatrix;
use std::io::BufRead;

/// Outcome of one file's ingestion
///
/// Returned for every file instead of swallowing failures: the caller
/// decides how to report skipped lines and unreadable files.
#[derive(Debug)]
pub struct FileSummary {
    pub sample: Box<str>,
    pub column: usize,
    pub inserted: usize,
    pub malformed: usize,
    pub unreadable: bool,
}

/// List the count files (`.txt` or `.txt.gz`) of a directory, sorted by
/// file name. A sample's position in this list is its column index.
pub fn list_count_files(input_dir: &str) -> anyhow::Result<Vec<Box<str>>> {
    let mut files = vec![];

    for entry in std::fs::read_dir(input_dir)
        .map_err(|e| anyhow::anyhow!("cannot read input directory {}: {}", input_dir, e))?
    {
        let path = entry?.path();
        if path.is_file() && is_count_file(&path) {
            if let Some(path) = path.to_str() {
                files.push(Box::from(path));
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_count_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .and_then(|x| x.to_str())
        .unwrap_or_default()
        .to_lowercase();
    name.ends_with(".txt") || name.ends_with(".txt.gz")
}

/// File name without the leading directories, extension kept
pub fn file_name(path: &str) -> Box<str> {
    Path::new(path)
        .file_name()
        .and_then(|x| x.to_str())
        .unwrap_or_default()
        .into()
}

/// Build the matrix from the count files: the first file fixes the gene
/// index and every file populates its own column, all files in parallel.
///
/// In best-effort mode (`strict = false`) malformed lines and unreadable
/// files are logged, counted in the returned summaries, and skipped. A file
/// with more data rows than the reference aborts in either mode.
pub fn build_matrix(
    files: &[Box<str>],
    strict: bool,
) -> anyhow::Result<(SparseExpressionMatrix, Vec<FileSummary>)> {
    let reference = files
        .first()
        .ok_or(anyhow::anyhow!("no count files to ingest"))?;

    let gene_names = read_gene_index(reference)?;
    info!("{} genes in reference file {}", gene_names.len(), reference);

    let sample_names: Vec<Box<str>> = files.iter().map(|f| file_name(f)).collect();
    let matrix = SparseExpressionMatrix::new(gene_names, sample_names);

    let njobs = files.len() as u64;
    info!("ingesting {} count files", njobs);

    let summaries = files
        .par_iter()
        .enumerate()
        .progress_count(njobs)
        .map(|(column, file)| ingest_count_file(file, column, &matrix, strict))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok((matrix, summaries))
}

/// Ingest one file into its column of the shared matrix.
///
/// Row index is the 0-based data-line position after the skipped header
/// lines; zero counts are suppressed at this boundary.
fn ingest_count_file(
    count_file: &str,
    column: usize,
    matrix: &SparseExpressionMatrix,
    strict: bool,
) -> anyhow::Result<FileSummary> {
    let sample = file_name(count_file);
    let mut summary = FileSummary {
        sample: sample.clone(),
        column,
        inserted: 0,
        malformed: 0,
        unreadable: false,
    };

    let reader = match io::open_buf_reader(count_file) {
        Ok(reader) => reader,
        Err(e) => {
            if strict {
                return Err(anyhow::anyhow!("cannot open {}: {}", count_file, e));
            }
            warn!("skipping unreadable file {}: {}", count_file, e);
            summary.unreadable = true;
            return Ok(summary);
        }
    };

    let nrows = matrix.num_rows();

    for (row, line) in reader.lines().skip(HEADER_LINES).enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                if strict {
                    return Err(anyhow::anyhow!("read error in {}: {}", count_file, e));
                }
                warn!("{}: read error after {} data rows: {}", sample, row, e);
                summary.unreadable = true;
                break;
            }
        };

        if row >= nrows {
            return Err(anyhow::anyhow!(
                "{} has more than {} data rows; \
		 all count files must share the reference file's gene list",
                count_file,
                nrows
            ));
        }

        match parse_count_record(&line) {
            Ok(record) if record.count > 0 => {
                matrix.set(row, column, record.count);
                summary.inserted += 1;
            }
            Ok(_) => {} // zero counts stay out of the sparse matrix
            Err(e) => {
                if strict {
                    return Err(e.context(format!(
                        "{}: line {}",
                        count_file,
                        row + HEADER_LINES + 1
                    )));
                }
                warn!("{}: skipping line {}: {}", sample, row + HEADER_LINES + 1, e);
                summary.malformed += 1;
            }
        }
    }

    Ok(summary)
}
