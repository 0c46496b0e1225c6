//! Type system for the Lucite C99 front end.
//!
//! One [`TypeContext`] exists per translation unit. It owns every type
//! ever created (an arena addressed by `TypeId`), holds the builtin
//! void/arithmetic types, and implements the arithmetic-type queries the
//! conversion rules are built on: conversion ranks, integer promotion,
//! and the memoized bit-size query.

mod context;

pub use context::{arith_bit_width, TypeContext, TypeSizeError};
