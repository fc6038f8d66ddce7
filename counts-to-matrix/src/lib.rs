pub mod common;
pub mod count_file; // featureCounts output parsing
pub mod ingest; // parallel matrix population
pub mod matrix_writer; // mtx and tsv serialization
pub mod run_convert;
pub mod sparse_matrix; // coordinate-keyed expression matrix
