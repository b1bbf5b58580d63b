//! Numeric and pixel-level building blocks
//!
//! This module provides the leaf stages of grid import:
//! - Linear solver (Gaussian elimination with partial pivoting)
//! - Geometry (homography estimation from four corners)
//! - Grayscale conversion (BT.709 luminance)
//! - Binarization (fixed and Otsu thresholds)

pub mod binarization;
pub mod geometry;
pub mod grayscale;
pub mod linear;
