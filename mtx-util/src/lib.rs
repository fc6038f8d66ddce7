pub mod common_io; // gzip-aware buffered readers and writers
pub mod mtx_io; // MatrixMarket coordinate files
