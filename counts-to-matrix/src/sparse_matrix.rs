use fnv::FnvHashMap;
use std::sync::Mutex;

/// Coordinate-keyed sparse count matrix with fixed dimensions and owned
/// row/column name lists.
///
/// Mutation goes through one coarse lock, so concurrent ingestion tasks can
/// share the matrix by reference; each task writes a disjoint column and
/// file I/O dominates, so contention stays low.
///
/// The entry counter keeps counting on repeated `set` calls at the same
/// coordinate: it tracks insertions, not distinct coordinates.
#[derive(Debug)]
pub struct SparseExpressionMatrix {
    gene_names: Vec<Box<str>>,
    sample_names: Vec<Box<str>>,
    store: Mutex<TripletStore>,
}

#[derive(Debug)]
struct TripletStore {
    values: FnvHashMap<(usize, usize), u64>,
    ninserts: usize,
}

impl SparseExpressionMatrix {
    /// Dimensions are fixed by the two name lists: rows = genes,
    /// columns = samples. The matrix starts empty.
    pub fn new(gene_names: Vec<Box<str>>, sample_names: Vec<Box<str>>) -> Self {
        Self {
            gene_names,
            sample_names,
            store: Mutex::new(TripletStore {
                values: FnvHashMap::default(),
                ninserts: 0,
            }),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.gene_names.len()
    }

    pub fn num_columns(&self) -> usize {
        self.sample_names.len()
    }

    pub fn gene_names(&self) -> &[Box<str>] {
        &self.gene_names
    }

    pub fn sample_names(&self) -> &[Box<str>] {
        &self.sample_names
    }

    /// Insert a value unconditionally: a later value overwrites an earlier
    /// one at the same coordinate, but the entry counter still goes up.
    /// Callers filter out zero counts.
    pub fn set(&self, row: usize, column: usize, value: u64) {
        debug_assert!(row < self.num_rows());
        debug_assert!(column < self.num_columns());

        let mut store = self.store.lock().expect("failed to lock matrix store");
        store.ninserts += 1;
        store.values.insert((row, column), value);
    }

    /// Stored value at a coordinate, 0 if absent
    pub fn get(&self, row: usize, column: usize) -> u64 {
        let store = self.store.lock().expect("failed to lock matrix store");
        store.values.get(&(row, column)).copied().unwrap_or(0)
    }

    /// Number of insertions performed so far (not deduplicated)
    pub fn entries_count(&self) -> usize {
        let store = self.store.lock().expect("failed to lock matrix store");
        store.ninserts
    }

    /// Snapshot of the stored entries, in the store's iteration order
    pub fn to_triplets(&self) -> Vec<(usize, usize, u64)> {
        let store = self.store.lock().expect("failed to lock matrix store");
        store
            .values
            .iter()
            .map(|(&(row, column), &value)| (row, column, value))
            .collect()
    }
}
