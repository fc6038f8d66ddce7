use counts_to_matrix::ingest::*;
use counts_to_matrix::matrix_writer::*;
use counts_to_matrix::run_convert::*;
use mtx_util::common_io::{read_lines, write_lines};
use mtx_util::mtx_io::read_mtx_triplets;
use std::path::Path;
use tempfile::TempDir;

fn write_count_file(dir: &Path, name: &str, records: &[(&str, u64)]) -> anyhow::Result<()> {
    let data_lines: Vec<String> = records
        .iter()
        .enumerate()
        .map(|(i, (gene, count))| {
            let start = 1000 * (i + 1);
            format!("{}\t1\t{}\t{}\t+\t940\t{}", gene, start, start + 900, count)
        })
        .collect();

    write_raw_count_file(
        dir,
        name,
        &data_lines.iter().map(|x| x.as_ref()).collect::<Vec<_>>(),
    )
}

fn write_raw_count_file(dir: &Path, name: &str, data_lines: &[&str]) -> anyhow::Result<()> {
    let mut lines: Vec<Box<str>> = vec![
        "# Program:featureCounts v2.0.1; Command:\"featureCounts\"".into(),
        "Geneid\tChr\tStart\tEnd\tStrand\tLength\tcell.bam".into(),
    ];
    lines.extend(data_lines.iter().map(|x| Box::from(*x)));

    write_lines(&lines, dir.join(name).to_str().unwrap())?;
    Ok(())
}

// ─────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────

#[test]
fn list_count_files_test() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_count_file(dir.path(), "cell_0002.txt", &[("G1", 1)])?;
    write_count_file(dir.path(), "cell_0001.txt", &[("G1", 1)])?;
    write_count_file(dir.path(), "cell_0003.txt.gz", &[("G1", 1)])?;
    std::fs::write(dir.path().join("notes.tsv"), "ignored\n")?;

    let files = list_count_files(dir.path().to_str().unwrap())?;
    let names: Vec<Box<str>> = files.iter().map(|f| file_name(f)).collect();

    // sorted by file name; non-count files are ignored
    assert_eq!(
        names,
        vec![
            Box::from("cell_0001.txt"),
            Box::from("cell_0002.txt"),
            Box::from("cell_0003.txt.gz")
        ]
    );

    Ok(())
}

// ─────────────────────────────────────────────────────
// Ingestion
// ─────────────────────────────────────────────────────

#[test]
fn two_files_two_genes_test() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_count_file(dir.path(), "cell_0001.txt", &[("G1", 5), ("G2", 0)])?;
    write_count_file(dir.path(), "cell_0002.txt", &[("G1", 0), ("G2", 3)])?;

    let files = list_count_files(dir.path().to_str().unwrap())?;
    let (matrix, summaries) = build_matrix(&files, false)?;

    assert_eq!(matrix.num_rows(), 2);
    assert_eq!(matrix.num_columns(), 2);
    assert_eq!(matrix.entries_count(), 2);
    assert_eq!(matrix.get(0, 0), 5);
    assert_eq!(matrix.get(1, 1), 3);
    assert!(summaries.iter().all(|s| s.malformed == 0 && !s.unreadable));

    let out_dir = dir.path().join("output");
    let out_dir = out_dir.to_str().unwrap();
    SparseMtxWriter::new(out_dir, &matrix).write()?;

    let mtx_file = format!("{}/{}", out_dir, MTX_FILENAME);
    let lines = read_lines(&mtx_file)?;
    assert_eq!(lines[2].as_ref(), "2 2 2");

    // round-trip: the written file reconstructs the same triplet set
    let (triplets, shape) = read_mtx_triplets(&mtx_file)?;
    assert_eq!((shape.nrows, shape.ncols, shape.nnz), (2, 2, 2));
    assert_eq!(triplets, vec![(0, 0, 5), (1, 1, 3)]);

    Ok(())
}

#[test]
fn entries_match_nonzero_counts_test() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_count_file(
        dir.path(),
        "cell_0001.txt",
        &[("G1", 20), ("G2", 0), ("G3", 89)],
    )?;
    write_count_file(
        dir.path(),
        "cell_0002.txt",
        &[("G1", 0), ("G2", 200), ("G3", 0)],
    )?;
    write_count_file(
        dir.path(),
        "cell_0003.txt.gz",
        &[("G1", 1), ("G2", 2), ("G3", 3)],
    )?;

    let files = list_count_files(dir.path().to_str().unwrap())?;
    let (matrix, _) = build_matrix(&files, false)?;

    // one entry per non-zero count across all files
    assert_eq!(matrix.entries_count(), 6);

    let out_dir = dir.path().join("output");
    let out_dir = out_dir.to_str().unwrap();
    SparseMtxWriter::new(out_dir, &matrix).write()?;

    // zero-suppression: no data line carries a zero value
    let mtx_file = format!("{}/{}", out_dir, MTX_FILENAME);
    let (triplets, _) = read_mtx_triplets(&mtx_file)?;
    assert_eq!(triplets.len(), 6);
    assert!(triplets.iter().all(|&(_, _, value)| value > 0));

    Ok(())
}

#[test]
fn shorter_file_underpopulates_test() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_count_file(dir.path(), "cell_0001.txt", &[("G1", 5), ("G2", 7)])?;
    write_count_file(dir.path(), "cell_0002.txt", &[("G1", 2)])?;

    let files = list_count_files(dir.path().to_str().unwrap())?;
    let (matrix, _) = build_matrix(&files, false)?;

    // the missing trailing row contributes nothing
    assert_eq!(matrix.entries_count(), 3);
    assert_eq!(matrix.get(0, 1), 2);
    assert_eq!(matrix.get(1, 1), 0);

    Ok(())
}

#[test]
fn longer_file_aborts_test() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_count_file(dir.path(), "cell_0001.txt", &[("G1", 5)])?;
    write_count_file(dir.path(), "cell_0002.txt", &[("G1", 1), ("G2", 2)])?;

    let files = list_count_files(dir.path().to_str().unwrap())?;
    let result = build_matrix(&files, false);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("data rows"));

    Ok(())
}

#[test]
fn malformed_line_skipped_test() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_count_file(dir.path(), "cell_0001.txt", &[("G1", 5), ("G2", 7)])?;
    write_raw_count_file(
        dir.path(),
        "cell_0002.txt",
        &["G1\t1\t1000\t1900\t+\t940\tNA", "G2\t1\t2000\t2900\t+\t940\t3"],
    )?;

    let files = list_count_files(dir.path().to_str().unwrap())?;
    let (matrix, summaries) = build_matrix(&files, false)?;

    // the bad line is dropped, the rest of the file still lands
    assert_eq!(summaries[1].malformed, 1);
    assert_eq!(summaries[1].inserted, 1);
    assert_eq!(matrix.get(0, 1), 0);
    assert_eq!(matrix.get(1, 1), 3);

    Ok(())
}

#[test]
fn malformed_line_aborts_in_strict_mode() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_count_file(dir.path(), "cell_0001.txt", &[("G1", 5)])?;
    write_raw_count_file(dir.path(), "cell_0002.txt", &["G1\t1\t1000\t1900\t+\t940\tNA"])?;

    let files = list_count_files(dir.path().to_str().unwrap())?;
    assert!(build_matrix(&files, true).is_err());

    Ok(())
}

#[test]
fn unreadable_file_test() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_count_file(dir.path(), "cell_0001.txt", &[("G1", 5)])?;

    let missing: Box<str> = dir.path().join("missing.txt").to_str().unwrap().into();
    let files = vec![
        dir.path()
            .join("cell_0001.txt")
            .to_str()
            .unwrap()
            .into(),
        missing,
    ];

    // best-effort: the column stays empty, the run carries on
    let (matrix, summaries) = build_matrix(&files, false)?;
    assert!(summaries[1].unreadable);
    assert_eq!(summaries[1].inserted, 0);
    assert_eq!(matrix.get(0, 1), 0);

    // strict: the missing file is fatal
    assert!(build_matrix(&files, true).is_err());

    Ok(())
}

// ─────────────────────────────────────────────────────
// End to end
// ─────────────────────────────────────────────────────

#[test]
fn run_convert_test() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_count_file(dir.path(), "cell_0001.txt", &[("G1", 5), ("G2", 0)])?;
    write_count_file(dir.path(), "cell_0002.txt", &[("G1", 0), ("G2", 3)])?;

    let args = ConvertArgs {
        input_dir: dir.path().to_str().unwrap().into(),
        output_dir: None,
        strict: false,
        dense: true,
    };
    run_convert(&args)?;

    // output defaults to <input>/output
    let out_dir = dir.path().join("output");
    assert!(out_dir.join(MTX_FILENAME).is_file());
    assert!(out_dir.join(DENSE_FILENAME).is_file());

    let genes = read_lines(out_dir.join(GENES_FILENAME).to_str().unwrap())?;
    let samples = read_lines(out_dir.join(SAMPLES_FILENAME).to_str().unwrap())?;
    assert_eq!(genes.len(), 2);
    assert_eq!(
        samples,
        vec![Box::from("cell_0001.txt"), Box::from("cell_0002.txt")]
    );

    Ok(())
}

#[test]
fn run_convert_empty_dir_test() -> anyhow::Result<()> {
    let dir = TempDir::new()?;

    let args = ConvertArgs {
        input_dir: dir.path().to_str().unwrap().into(),
        output_dir: None,
        strict: false,
        dense: false,
    };

    assert!(run_convert(&args).is_err());

    Ok(())
}
