//! Serialization of the expression matrix
//!
//! `matrix.mtx` is the primary output; `genes.tsv` and `samples.tsv` carry
//! the row and column names that make it interpretable. A dense `matrix.tsv`
//! is available for small matrices.

use crate::common::*;
use crate::sparse_matrix::SparseExpressionMatrix;
use fnv::FnvHashMap;
use std::io::Write;

pub const MTX_FILENAME: &str = "matrix.mtx";
pub const DENSE_FILENAME: &str = "matrix.tsv";
pub const GENES_FILENAME: &str = "genes.tsv";
pub const SAMPLES_FILENAME: &str = "samples.tsv";

/// Serialization seam shared by the sparse and the dense writer
pub trait MatrixWriter {
    fn write(&self) -> anyhow::Result<()>;
}

/// MatrixMarket coordinate writer: three header lines, then one line per
/// stored entry with 1-based indices and integer values.
pub struct SparseMtxWriter<'a> {
    output_dir: Box<str>,
    matrix: &'a SparseExpressionMatrix,
}

impl<'a> SparseMtxWriter<'a> {
    pub fn new(output_dir: &str, matrix: &'a SparseExpressionMatrix) -> Self {
        Self {
            output_dir: output_dir.into(),
            matrix,
        }
    }
}

impl MatrixWriter for SparseMtxWriter<'_> {
    fn write(&self) -> anyhow::Result<()> {
        mkdir(&self.output_dir)?;

        let mtx_file = format!("{}/{}", self.output_dir, MTX_FILENAME);
        let mut buf = io::open_buf_writer(&mtx_file)
            .map_err(|e| anyhow::anyhow!("cannot create {}: {}", mtx_file, e))?;

        // the entry counter goes into the header, not the stored-entry count
        writeln!(buf, "%%MatrixMarket matrix coordinate real general")?;
        writeln!(buf, "%")?;
        writeln!(
            buf,
            "{} {} {}",
            self.matrix.num_rows(),
            self.matrix.num_columns(),
            self.matrix.entries_count()
        )?;

        // 1-based indices; zero values are dropped once more on the way out
        for (row, column, value) in self.matrix.to_triplets() {
            if value == 0 {
                continue;
            }
            writeln!(buf, "{} {} {}", row + 1, column + 1, value)?;
        }

        buf.flush()?;
        Ok(())
    }
}

/// Dense tab-separated writer: `gene-id` header row, then one row per gene
/// with zeros materialized
pub struct DenseMatrixWriter<'a> {
    output_dir: Box<str>,
    matrix: &'a SparseExpressionMatrix,
}

impl<'a> DenseMatrixWriter<'a> {
    pub fn new(output_dir: &str, matrix: &'a SparseExpressionMatrix) -> Self {
        Self {
            output_dir: output_dir.into(),
            matrix,
        }
    }
}

impl MatrixWriter for DenseMatrixWriter<'_> {
    fn write(&self) -> anyhow::Result<()> {
        mkdir(&self.output_dir)?;

        let tsv_file = format!("{}/{}", self.output_dir, DENSE_FILENAME);
        let mut buf = io::open_buf_writer(&tsv_file)
            .map_err(|e| anyhow::anyhow!("cannot create {}: {}", tsv_file, e))?;

        write!(buf, "gene-id")?;
        for sample in self.matrix.sample_names() {
            write!(buf, "\t{}", sample)?;
        }
        writeln!(buf)?;

        let values: FnvHashMap<(usize, usize), u64> = self
            .matrix
            .to_triplets()
            .into_iter()
            .map(|(row, column, value)| ((row, column), value))
            .collect();

        for (row, gene) in self.matrix.gene_names().iter().enumerate() {
            write!(buf, "{}", gene)?;
            for column in 0..self.matrix.num_columns() {
                let value = values.get(&(row, column)).copied().unwrap_or(0);
                write!(buf, "\t{}", value)?;
            }
            writeln!(buf)?;
        }

        buf.flush()?;
        Ok(())
    }
}

/// Row and column name files, one identifier per line, in matrix order
pub fn write_axis_files(output_dir: &str, matrix: &SparseExpressionMatrix) -> anyhow::Result<()> {
    mkdir(output_dir)?;

    io::write_lines(
        matrix.gene_names(),
        &format!("{}/{}", output_dir, GENES_FILENAME),
    )?;
    io::write_lines(
        matrix.sample_names(),
        &format!("{}/{}", output_dir, SAMPLES_FILENAME),
    )?;
    Ok(())
}

fn mkdir(dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow::anyhow!("failed to create output directory {}: {}", dir, e))
}
