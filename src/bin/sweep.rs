//! Compares two memset implementations over a size sweep and writes the
//! results to stdout as CSV.

use core::ffi::c_void;
use std::io;

use fastfill::fill::memset_local;
use fastfill::sweep::run_sweep;

unsafe extern "C" {
    #[link_name = "memset"]
    fn libc_memset(dest: *mut c_void, c: i32, n: usize) -> *mut c_void;
}

/// libc `memset` adapted to the harness calling convention.
unsafe fn memset_baseline(s: *mut u8, c: i32, n: usize) -> *mut u8 {
    // SAFETY: same contract as the harness fill type; forwarded as-is.
    unsafe { libc_memset(s as *mut c_void, c, n) as *mut u8 }
}

fn main() -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_sweep(&mut out, memset_baseline, memset_local)
}
