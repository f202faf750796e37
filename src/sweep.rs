//! Throughput comparison harness.
//!
//! Times two fill implementations over a sweep of sizes and emits one
//! CSV row per size: the median of repeated timing samples for each
//! implementation, plus their ratio. Both implementations are passed in
//! as explicit function values so tests can substitute stand-ins, and
//! measurement runs strictly sequentially; timing windows never overlap.

use std::io::{self, Write};
use std::time::Instant;

/// C-convention fill function: `(dest, value, len) -> dest`. Only the
/// low 8 bits of `value` are significant.
pub type FillFn = unsafe fn(*mut u8, i32, usize) -> *mut u8;

/// Fill invocations per timing sample.
pub const ITERS: u64 = 100_000_000;

/// Timing samples per (size, implementation) pair.
pub const SAMPLES: usize = 10;

/// Buffer alignment used by the sweep.
pub const ALIGN: usize = 16;

/// Offset from the aligned base used by the sweep.
pub const OFFSET: usize = 0;

/// Guard space allocated beyond the largest swept size; covers the
/// worst-case alignment skew plus offset.
const PAD: usize = 256;

/// CSV header emitted before the first row.
pub const HEADER: &str = "size, alignment, offset, libc, local";

/// Median of a sample set. Sorts in place; for even lengths this picks
/// the upper of the two middle values.
///
/// # Panics
///
/// Panics on an empty sample set.
pub fn median(samples: &mut [u64]) -> u64 {
    assert!(!samples.is_empty(), "median of empty sample set");
    samples.sort_unstable();
    samples[samples.len() / 2]
}

/// Collect `samples` batch durations and reduce them to the median.
///
/// `batch` returns the elapsed nanoseconds of one repetition batch; it
/// is the injection seam for synthetic timers in tests.
pub fn measure_with(mut batch: impl FnMut() -> u64, samples: usize) -> u64 {
    let mut tv: Vec<u64> = (0..samples).map(|_| batch()).collect();
    median(&mut tv)
}

/// Median time in nanoseconds for `iters` back-to-back invocations of
/// `fill`, over `samples` samples.
///
/// # Safety
///
/// `ptr` must be valid for writes of `size` bytes for the duration of
/// the measurement.
pub unsafe fn measure(fill: FillFn, ptr: *mut u8, size: usize, iters: u64, samples: usize) -> u64 {
    measure_with(
        || {
            let start = Instant::now();
            for _ in 0..iters {
                // SAFETY: caller guarantees `ptr` is writable for `size`
                // bytes; black_box keeps the call from being hoisted out.
                std::hint::black_box(unsafe { fill(ptr, 0, size) });
            }
            start.elapsed().as_nanos() as u64
        },
        samples,
    )
}

/// Round `base` up to a multiple of `align`, then advance by `offset`.
///
/// The caller must have reserved enough space past the region for the
/// worst-case adjustment (`align - 1 + offset` bytes).
///
/// # Panics
///
/// Panics if `align` is not a power of two.
pub fn align_pointer(base: *mut u8, align: usize, offset: usize) -> *mut u8 {
    assert!(align.is_power_of_two(), "alignment must be a power of two");
    let skew = (base as usize).wrapping_neg() & (align - 1);
    base.wrapping_add(skew + offset)
}

/// One row of the sweep: placement parameters plus the two median
/// timings. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepRow {
    pub size: usize,
    pub align: usize,
    pub offset: usize,
    pub baseline_ns: u64,
    pub local_ns: u64,
}

impl SweepRow {
    /// Baseline median over local median; above 1.0 the local
    /// implementation is faster.
    pub fn ratio(&self) -> f64 {
        self.baseline_ns as f64 / self.local_ns as f64
    }
}

impl std::fmt::Display for SweepRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}, {:.3},",
            self.size,
            self.align,
            self.offset,
            self.baseline_ns,
            self.local_ns,
            self.ratio()
        )
    }
}

/// Sweep driver with injectable sizes and sample counts.
///
/// For each size: stage a zeroed buffer, position the target pointer at
/// [`ALIGN`]/[`OFFSET`], measure the baseline, then the local
/// implementation, then emit the row.
pub fn run_sweep_with(
    out: &mut impl Write,
    baseline: FillFn,
    local: FillFn,
    sizes: impl IntoIterator<Item = usize>,
    iters: u64,
    samples: usize,
) -> io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for size in sizes {
        let mut memory = vec![0u8; size + PAD];
        let ptr = align_pointer(memory.as_mut_ptr(), ALIGN, OFFSET);
        // SAFETY: `memory` reserves PAD bytes beyond `size`, more than
        // the worst-case alignment skew plus offset.
        let baseline_ns = unsafe { measure(baseline, ptr, size, iters, samples) };
        let local_ns = unsafe { measure(local, ptr, size, iters, samples) };
        let row = SweepRow {
            size,
            align: ALIGN,
            offset: OFFSET,
            baseline_ns,
            local_ns,
        };
        writeln!(out, "{row}")?;
    }
    Ok(())
}

/// The production sweep: sizes `0..512` at alignment 16, offset 0,
/// [`ITERS`] invocations per sample, [`SAMPLES`] samples per
/// implementation.
pub fn run_sweep(out: &mut impl Write, baseline: FillFn, local: FillFn) -> io::Result<()> {
    run_sweep_with(out, baseline, local, 0..512, ITERS, SAMPLES)
}
