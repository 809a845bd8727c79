//! Core business logic for Muhasib.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `tax` - VAT and Zakat calculation, filing status transitions
//! - `invoice` - Invoice total aggregation and status derivation
//! - `access` - Role-scoped visibility and mutation policy
//! - `task` - Task status transitions
//! - `reports` - Revenue/VAT/Zakat/task aggregation and CSV export
//! - `dashboard` - Headline counters over scoped rows
//! - `storage` - Upload validation and document file store
//! - `auth` - Password hashing

pub mod access;
pub mod auth;
pub mod dashboard;
pub mod invoice;
pub mod reports;
pub mod storage;
pub mod task;
pub mod tax;
