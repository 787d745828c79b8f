//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete,
//! plus the parsing of free-text command parameters.

/// Autocomplete handlers for member names, types, templates and presets
pub mod autocomplete;
/// Parsing of dates, periods and list parameters
pub mod params;
