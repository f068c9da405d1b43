// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types.
//!
//! Two kinds of failure exist:
//!
//! - [`LatticeError`]: configuration errors. These are returned at construction
//!   or first use and terminate the current search invocation.
//! - [`Rejection`]: a candidate lattice was discarded during a search. These
//!   are never fatal and are tallied in the search statistics.

use std::fmt;
use strum_macros::EnumCount as EnumCountMacro;
use thiserror::Error;

use crate::size::{Compress, LatticeType};

/// Configuration errors raised by the storage, enumeration and search layers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LatticeError {
    #[error("no symmetric kernel implemented for {lattice} lattices")]
    NoSymmetricKernel { lattice: LatticeType },

    #[error("per-level order CYCLIC is invalid for {reason}")]
    InvalidCyclicOrder { reason: &'static str },

    #[error("storage and lattice size parameters do not match ({storage} vs {lattice})")]
    SizeParamMismatch { storage: String, lattice: String },

    #[error("index {index} out of range for sequence of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("figure of merit is undefined for an empty projection")]
    EmptyProjection,

    #[error("projection coordinate {coordinate} does not exist in dimension {dimension}")]
    NoSuchProjection { coordinate: usize, dimension: usize },

    #[error("{value} is not prime")]
    NotPrime { value: u64 },

    #[error("modulus {modulus} is not a prime power")]
    NotPrimePower { modulus: u64 },

    #[error("polynomial {poly:#b} is not irreducible")]
    NotIrreducible { poly: u64 },

    #[error("stride {value} is not coprime with modulus {modulus}")]
    NotCoprime { value: u64, modulus: u64 },

    #[error("kernel {kernel} must be symmetric to be used with {compress} compression")]
    NonSymmetricKernel { kernel: String, compress: Compress },

    #[error("kernel {kernel}: alpha must be one of {allowed}, got {alpha}")]
    InvalidAlpha {
        kernel: &'static str,
        alpha: u32,
        allowed: &'static str,
    },

    #[error("generator {generator} has order {order}, expected {expected} modulo {modulus}")]
    GeneratorMismatch {
        generator: u64,
        order: usize,
        expected: usize,
        modulus: u64,
    },

    #[error("dimension {requested} exceeds generating vector length {available}")]
    DimensionMismatch { requested: usize, available: usize },

    #[error("dimension {dimension} is above the supported maximum {max}")]
    DimensionTooLarge { dimension: usize, max: usize },

    #[error("{base}^{exp} does not fit in 64 bits")]
    Overflow { base: u64, exp: u32 },

    #[error("no acceptable candidate for coordinate {dimension}")]
    NoCandidate { dimension: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LatticeError>;

/// Reasons a candidate lattice is discarded during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumCountMacro)]
#[repr(u8)]
pub enum Rejection {
    /// A merit filter refused the value.
    Filtered,

    /// The progress observers voted to stop the accumulation.
    Aborted,

    /// The merit evaluated to NaN or infinity.
    NonFinite,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Filtered => write!(f, "rejected by merit filter"),
            Rejection::Aborted => write!(f, "aborted by progress observer"),
            Rejection::NonFinite => write!(f, "non-finite merit value"),
        }
    }
}
