//! Derives the maximum legal physical address from CPU capability.

use crate::platform::AddressWidthSource;
use smm_memory_addresses::PhysicalAddress;

/// Paging cannot translate more than 48 bits of physical address, no
/// matter how wide the physical bus is.
const PAGING_WIDTH_LIMIT: u8 = 48;

/// Architectural ceiling on the reported physical address width.
const ARCHITECTURAL_WIDTH_LIMIT: u8 = 52;

/// Conservative fallback when the CPU reports no width at all.
const FALLBACK_WIDTH: u8 = 36;

/// Highest physical address the privileged context may ever touch.
///
/// Prefers the width recorded by early boot firmware and falls back to a
/// direct CPU query. Runs once, before any untrusted call is possible;
/// there is no failure path beyond the conservative fallback.
#[must_use]
pub fn compute_max_address<W: AddressWidthSource>(source: &W) -> PhysicalAddress {
    let raw = source
        .recorded_width()
        .unwrap_or_else(|| source.cpu_width());
    let raw = if raw == 0 { FALLBACK_WIDTH } else { raw };
    debug_assert!(
        raw <= ARCHITECTURAL_WIDTH_LIMIT,
        "reported physical address width {raw} exceeds the architectural limit"
    );
    let width = raw.min(PAGING_WIDTH_LIMIT);
    PhysicalAddress::new((1_u64 << width) - 1)
}
