pub use mtx_util::common_io as io;

pub use clap::{ArgAction, Parser};
pub use env_logger;

pub use log::{info, warn};
pub use std::path::{Path, PathBuf};

pub use indicatif::ParallelProgressIterator;
pub use rayon::prelude::*;
