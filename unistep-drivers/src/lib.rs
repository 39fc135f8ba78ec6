//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in unistep-core:
//!
//! - Winding outputs (ULN2003 and other four-input unipolar drivers)

#![no_std]
#![deny(unsafe_code)]

pub mod winding;
