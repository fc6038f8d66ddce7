use crate::common_io::*;
use rayon::prelude::*;

/// Dimensions declared in the `rows cols nnz` header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MtxShape {
    pub nrows: usize,
    pub ncols: usize,
    pub nnz: usize,
}

/// Read a MatrixMarket coordinate file with integer values and return a
/// vector of 0-based triplets (row, col, val) sorted by column, then row.
///
/// `%`-prefixed comment lines are skipped; the first remaining line must be
/// the `rows cols nnz` shape line.
///
/// * `mtx_file` - path to the matrix market file--either gzipped or not
pub fn read_mtx_triplets(mtx_file: &str) -> anyhow::Result<(Vec<(u64, u64, u64)>, MtxShape)> {
    let lines = read_lines(mtx_file)?;

    let mut data_lines = lines.iter().filter(|x| !x.starts_with('%'));

    let shape_line = data_lines
        .next()
        .ok_or(anyhow::anyhow!("no shape line in {}", mtx_file))?;

    let shape = parse_shape_line(shape_line)
        .ok_or(anyhow::anyhow!("failed to parse mtx header: {}", shape_line))?;

    // Convert a triplet of strings to 0-based (row, col, val)
    fn parse_row_col_val(line: &Box<str>) -> Option<(u64, u64, u64)> {
        let mut words = line.split_whitespace();

        // convert 1-based to 0-based
        let row = words.next()?.parse::<u64>().ok()?.checked_sub(1)?;
        let col = words.next()?.parse::<u64>().ok()?.checked_sub(1)?;
        let val = words.next()?.parse::<u64>().ok()?;

        Some((row, col, val))
    }

    let mut mtx_triplets = data_lines
        .par_bridge()
        .filter_map(parse_row_col_val)
        .collect::<Vec<_>>();

    mtx_triplets.sort_by_key(|&(row, _, _)| row);
    mtx_triplets.sort_by_key(|&(_, col, _)| col);
    Ok((mtx_triplets, shape))
}

fn parse_shape_line(line: &str) -> Option<MtxShape> {
    let mut words = line.split_whitespace();

    let nrows = words.next()?.parse::<usize>().ok()?;
    let ncols = words.next()?.parse::<usize>().ok()?;
    let nnz = words.next()?.parse::<usize>().ok()?;

    Some(MtxShape { nrows, ncols, nnz })
}
