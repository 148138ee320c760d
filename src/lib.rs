//! # dkp
//!
//! Purge docker containers and images that match filter expressions.
//!
//! ## Features
//!
//! - Filter expressions `<field><op><value>` with `=`, `!=`, `<`, `<=`, `>`, `>=`
//! - Calendar durations (`1y2m3d`) and binary sizes (`512m`, `2g`)
//! - Container fields `created` and `exited`, image fields `created`, `name`, `tag` and `size`
//! - All filters must match; an empty filter set never matches anything
//! - Dry run and confirmation before removal
//!
//! ## Usage
//!
//! ### Command Line
//!
//! ```bash
//! # Remove containers that exited more than a week ago
//! dkp container -f 'exited>7d'
//!
//! # Show which large, old nginx images would be removed
//! dkp image -f 'name=nginx' -f 'created>1m,size>200m' --dry-run
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use dkp_core::{Image, build_image_validator};
//!
//! let validator = build_image_validator(&["name=nginx", "size>100m"])?;
//!
//! let image = Image {
//!     id: "sha256:0123456789abcdef".to_string(),
//!     repo_tags: vec!["nginx:1.25".to_string()],
//!     size: 180 * 1024 * 1024,
//!     ..Default::default()
//! };
//! assert!(validator.satisfied(&image));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export core functionality
pub use dkp_core::*;
