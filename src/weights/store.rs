//! Sparse-over-dense strided weight storage.

use std::collections::BTreeMap;

use ndarray::Array2;

/// Canonical number of `f32` slots per feature index: slot 0 is the
/// weight, slots 1..6 are coin-betting optimizer accumulators.
pub const STRIDE: usize = 6;

/// Rows per dense page.
const PAGE_ROWS: u32 = 64;

/// Strided weight table: a sparse map of dense pages.
///
/// Each feature index owns one block of `stride` contiguous `f32` slots at
/// byte-level address `index * stride`; blocks live in fixed-height dense
/// pages (`[PAGE_ROWS, stride]` arrays) allocated lazily on first write.
/// Stride is fixed for the lifetime of the store, so every block address
/// is stride-aligned by construction.
///
/// Two stores compare equal iff the sorted sequences of
/// `(index, slot values…)` over their non-zero rows match exactly; this is
/// the comparison correctness tests use.
#[derive(Debug, Clone)]
pub struct WeightStore {
    stride: usize,
    pages: BTreeMap<u32, Array2<f32>>,
}

impl WeightStore {
    /// Create an empty store with the given block width.
    pub fn new(stride: usize) -> Self {
        assert!(stride > 0, "stride must be positive");
        WeightStore {
            stride,
            pages: BTreeMap::new(),
        }
    }

    /// Slots per block.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    fn locate(index: u32) -> (u32, usize) {
        (index / PAGE_ROWS, (index % PAGE_ROWS) as usize)
    }

    /// The block at `index`, if its page has been written.
    pub fn get(&self, index: u32) -> Option<&[f32]> {
        let (page_id, row) = Self::locate(index);
        self.pages
            .get(&page_id)
            .map(|page| page.row(row).to_slice().expect("page rows are contiguous"))
    }

    /// The weight (slot 0) at `index`, zero if never written.
    #[inline]
    pub fn weight(&self, index: u32) -> f32 {
        self.get(index).map_or(0.0, |block| block[0])
    }

    /// Mutable access to the block at `index`, allocating its page lazily.
    pub fn get_or_create(&mut self, index: u32) -> &mut [f32] {
        let (page_id, row) = Self::locate(index);
        let stride = self.stride;
        let page = self
            .pages
            .entry(page_id)
            .or_insert_with(|| Array2::zeros((PAGE_ROWS as usize, stride)));
        page.row_mut(row)
            .into_slice()
            .expect("page rows are contiguous")
    }

    /// Next index at or after `start` whose block is considered non-zero
    /// by the skip traversal.
    ///
    /// The skip traversal inspects **only slot 0**: a block whose weight
    /// is zero but whose accumulator slots are non-zero is skipped. This
    /// matches the behavior of previously exported models and is kept for
    /// compatibility; [`nonzero_rows`](Self::nonzero_rows) is the
    /// full-block scan used by [`split`](Self::split) and equality.
    pub fn next_nonzero(&self, start: u32) -> Option<u32> {
        let (start_page, start_row) = Self::locate(start);
        for (&page_id, page) in self.pages.range(start_page..) {
            let first_row = if page_id == start_page { start_row } else { 0 };
            for row in first_row..PAGE_ROWS as usize {
                if page[[row, 0]] != 0.0 {
                    return Some(page_id * PAGE_ROWS + row as u32);
                }
            }
        }
        None
    }

    /// Enumerate `(index, block)` pairs via the skip traversal.
    ///
    /// This is the enumeration contract exposed to model-export
    /// collaborators; it inherits the slot-0-only skip of
    /// [`next_nonzero`](Self::next_nonzero).
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (u32, &[f32])> + '_ {
        let mut cursor = 0u32;
        std::iter::from_fn(move || {
            let index = self.next_nonzero(cursor)?;
            cursor = index + 1;
            Some((index, self.get(index).expect("row was just found")))
        })
    }

    /// All rows with at least one non-zero slot, sorted by index.
    pub fn nonzero_rows(&self) -> Vec<(u32, &[f32])> {
        let mut rows = Vec::new();
        for (&page_id, page) in &self.pages {
            for row in 0..PAGE_ROWS as usize {
                let block = page.row(row).to_slice().expect("page rows are contiguous");
                if block.iter().any(|&slot| slot != 0.0) {
                    rows.push((page_id * PAGE_ROWS + row as u32, block));
                }
            }
        }
        rows
    }

    /// Partition every non-zero block by index parity.
    ///
    /// Returns `(even, odd)`: the block at `index` lands at `index >> 1`
    /// in the sub-store selected by `index & 1`. The source store is not
    /// mutated. Blocks are selected with the full-slot scan, so optimizer
    /// state survives the split even when the weight itself is zero.
    pub fn split(&self) -> (WeightStore, WeightStore) {
        let mut even = WeightStore::new(self.stride);
        let mut odd = WeightStore::new(self.stride);
        for (index, block) in self.nonzero_rows() {
            let target = if index & 1 == 0 { &mut even } else { &mut odd };
            target.get_or_create(index >> 1).copy_from_slice(block);
        }
        (even, odd)
    }

    /// Inverse of [`split`](Self::split): rebuild the interleaved store.
    ///
    /// # Panics
    ///
    /// Panics if the two stores have different strides.
    pub fn interleave(even: &WeightStore, odd: &WeightStore) -> WeightStore {
        assert_eq!(even.stride, odd.stride, "strides must match");
        let mut joint = WeightStore::new(even.stride);
        for (index, block) in even.nonzero_rows() {
            joint.get_or_create(index << 1).copy_from_slice(block);
        }
        for (index, block) in odd.nonzero_rows() {
            joint.get_or_create((index << 1) | 1).copy_from_slice(block);
        }
        joint
    }
}

impl PartialEq for WeightStore {
    fn eq(&self, other: &Self) -> bool {
        self.stride == other.stride && self.nonzero_rows() == other.nonzero_rows()
    }
}
