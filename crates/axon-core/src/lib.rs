//! Axon Core Types
//!
//! This crate provides the foundational types shared by the Axon diagram
//! engine. It includes:
//!
//! - **Identifiers**: String-interned element identifiers ([`identifier::Id`])
//! - **Colors**: CSS color validation and element styles ([`color`] module)
//! - **Geometry**: Points, sizes, bounds and grid rounding ([`geometry`] module)
//! - **Text**: Text styles and the measurement capability used by layout ([`text`] module)

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod text;
