//! Parsing of featureCounts output files
//!
//! One file per sample, tab-separated:
//! `geneId<TAB>chrom<TAB>start<TAB>end<TAB>strand<TAB>length<TAB>count`
//! preceded by two header lines. Only the gene identifier and the count
//! field are consumed.

use crate::common::*;
use std::io::BufRead;

/// featureCounts emits two header lines before the data
pub const HEADER_LINES: usize = 2;

/// 0-based offset of the count field in a data line
pub const COUNT_FIELD: usize = 6;

/// One parsed data line: the gene identifier and its read count
#[derive(Debug, PartialEq, Eq)]
pub struct CountRecord<'a> {
    pub gene_id: &'a str,
    pub count: u64,
}

/// Parse one featureCounts data line.
///
/// Fails on fewer than seven tab-separated fields or a non-integer count;
/// whether that skips the line or aborts the run is the caller's policy.
pub fn parse_count_record(line: &str) -> anyhow::Result<CountRecord<'_>> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() <= COUNT_FIELD {
        return Err(anyhow::anyhow!(
            "expected {} tab-separated fields, found {}",
            COUNT_FIELD + 1,
            fields.len()
        ));
    }

    let count = fields[COUNT_FIELD]
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("invalid count value '{}'", fields[COUNT_FIELD]))?;

    Ok(CountRecord {
        gene_id: fields[0],
        count,
    })
}

/// Read the authoritative gene list from the reference count file: skip the
/// header lines, then take the gene identifier of every line in file order.
///
/// Every other file is assumed to share this row order and row count.
pub fn read_gene_index(count_file: &str) -> anyhow::Result<Vec<Box<str>>> {
    let reader = io::open_buf_reader(count_file)
        .map_err(|e| anyhow::anyhow!("cannot open reference file {}: {}", count_file, e))?;

    let mut gene_names = vec![];
    for line in reader.lines().skip(HEADER_LINES) {
        let line = line?;
        let gene_id = line.split('\t').next().unwrap_or_default();
        gene_names.push(gene_id.into());
    }

    Ok(gene_names)
}
