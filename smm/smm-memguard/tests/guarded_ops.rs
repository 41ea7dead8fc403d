//! The guarded copy/fill primitives: validate, then transfer, fail
//! closed.
//!
//! These tests run the primitives against host memory: the mock platform
//! reports a 48-bit address space, so user-space pointers pass the bound
//! check, and "protected" ranges are placed over real buffers to exercise
//! rejection.

mod common;

use common::MockPlatform;
use smm_memguard::{
    MemGuard, MemoryRange, PhysicalAddress, RejectReason, SecurityViolation,
};

fn guard_protecting(ranges: Vec<MemoryRange>) -> MemGuard {
    let mut platform = MockPlatform::new();
    platform.ranges = ranges;
    MemGuard::init(&mut platform).unwrap()
}

fn pa_of<T>(slice: &[T]) -> PhysicalAddress {
    PhysicalAddress::from_ptr(slice.as_ptr())
}

fn pa_of_mut<T>(slice: &mut [T]) -> PhysicalAddress {
    PhysicalAddress::from_ptr(slice.as_mut_ptr())
}

#[test]
fn copy_to_protected_transfers_validated_bytes() {
    let guard = guard_protecting(Vec::new());
    let src = [0xAB_u8; 16];
    let mut dst = [0_u8; 16];

    unsafe { guard.copy_to_protected(dst.as_mut_ptr(), pa_of(&src), 16) }.unwrap();
    assert_eq!(dst, src);
}

#[test]
fn rejected_source_leaves_destination_untouched() {
    let src = [0xAB_u8; 16];
    let guard = guard_protecting(vec![MemoryRange::new(pa_of(&src), 16)]);
    let mut dst = [0x11_u8; 16];

    let err = unsafe { guard.copy_to_protected(dst.as_mut_ptr(), pa_of(&src), 16) }.unwrap_err();
    assert_eq!(err, SecurityViolation(RejectReason::ProtectedOverlap));
    assert_eq!(dst, [0x11_u8; 16]);
}

#[test]
fn copy_from_protected_validates_the_destination() {
    let src = [0x5A_u8; 8];
    let mut dst = [0_u8; 8];
    let guard = guard_protecting(Vec::new());

    unsafe { guard.copy_from_protected(pa_of_mut(&mut dst), src.as_ptr(), 8) }.unwrap();
    assert_eq!(dst, src);
}

#[test]
fn copy_from_protected_refuses_a_protected_destination() {
    let src = [0x5A_u8; 8];
    let mut dst = [0_u8; 8];
    let dst_pa = pa_of_mut(&mut dst);
    let guard = guard_protecting(vec![MemoryRange::new(dst_pa, 8)]);

    let err = unsafe { guard.copy_from_protected(dst_pa, src.as_ptr(), 8) }.unwrap_err();
    assert_eq!(err, SecurityViolation(RejectReason::ProtectedOverlap));
    assert_eq!(dst, [0_u8; 8]);
}

#[test]
fn overlapping_copy_has_memmove_semantics() {
    let guard = guard_protecting(Vec::new());
    let mut buf = *b"0123456789";

    let base = pa_of_mut(&mut buf);
    unsafe { guard.copy(base + 2, base, 8) }.unwrap();
    assert_eq!(&buf, b"0101234567");
}

#[test]
fn backward_overlapping_copy_is_also_exact() {
    let guard = guard_protecting(Vec::new());
    let mut buf = *b"0123456789";

    let base = pa_of_mut(&mut buf);
    unsafe { guard.copy(base, base + 2, 8) }.unwrap();
    assert_eq!(&buf, b"2345678989");
}

#[test]
fn copy_validates_both_sides() {
    let src = [1_u8; 8];
    let mut dst = [0_u8; 8];
    let dst_pa = pa_of_mut(&mut dst);

    let guard = guard_protecting(vec![MemoryRange::new(pa_of(&src), 8)]);
    let err = unsafe { guard.copy(dst_pa, pa_of(&src), 8) }.unwrap_err();
    assert_eq!(err, SecurityViolation(RejectReason::ProtectedOverlap));
    assert_eq!(dst, [0_u8; 8]);

    let guard = guard_protecting(vec![MemoryRange::new(dst_pa, 8)]);
    let err = unsafe { guard.copy(dst_pa, pa_of(&src), 8) }.unwrap_err();
    assert_eq!(err, SecurityViolation(RejectReason::ProtectedOverlap));
    assert_eq!(dst, [0_u8; 8]);
}

#[test]
fn fill_writes_the_value_after_validation() {
    let guard = guard_protecting(Vec::new());
    let mut dst = [0_u8; 12];

    unsafe { guard.fill(pa_of_mut(&mut dst), 12, 0xC3) }.unwrap();
    assert_eq!(dst, [0xC3_u8; 12]);
}

#[test]
fn fill_refuses_a_protected_destination() {
    let mut dst = [7_u8; 12];
    let dst_pa = pa_of_mut(&mut dst);
    let guard = guard_protecting(vec![MemoryRange::new(dst_pa, 12)]);

    let err = unsafe { guard.fill(dst_pa, 12, 0) }.unwrap_err();
    assert_eq!(err, SecurityViolation(RejectReason::ProtectedOverlap));
    assert_eq!(dst, [7_u8; 12]);
}

#[test]
fn zero_length_operations_succeed_without_touching_memory() {
    let guard = guard_protecting(Vec::new());
    let mut dst = [9_u8; 4];
    let src = [1_u8; 4];

    unsafe { guard.copy_to_protected(dst.as_mut_ptr(), pa_of(&src), 0) }.unwrap();
    let dst_pa = pa_of_mut(&mut dst);
    unsafe { guard.fill(dst_pa, 0, 0) }.unwrap();
    assert_eq!(dst, [9_u8; 4]);
}
