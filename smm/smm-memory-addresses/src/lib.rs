//! # Physical Memory Address Type
//!
//! A strongly typed wrapper for raw physical addresses used at the
//! firmware privilege boundary.
//!
//! ## Overview
//!
//! [`PhysicalAddress`] is a zero-cost `#[repr(transparent)]` wrapper around
//! `u64`. It carries intent: code handling pointers that originated below
//! the trust boundary deals in physical addresses, never in borrowed
//! references, until a validator has ruled on them. Keeping the type
//! distinct from ordinary integers and pointers makes it hard to
//! accidentally dereference an unvalidated value.
//!
//! ## Design Notes
//!
//! - The type implements `Copy`, `Eq`, `Ord`, and `Hash`, making it usable
//!   as a map key or for FFI.
//! - All arithmetic helpers are `const fn` and checked or saturating;
//!   there is no wrapping arithmetic on addresses.
//! - Conversion *to* a pointer is explicit ([`PhysicalAddress::as_ptr`] /
//!   [`PhysicalAddress::as_mut_ptr`]) and only meaningful in an
//!   identity-mapped context; dereferencing remains `unsafe` at the call
//!   site.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod physical_address;

pub use physical_address::PhysicalAddress;
