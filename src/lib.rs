//! Docsmith Toolkit
//!
//! Post-processing utilities for generated documents.
//!
//! This library provides:
//! - `toc_placeholders`: placeholder rows for an uncomputed DOCX table of contents
//! - `toc_styles` / `toc_field`: TOC style detection and field boundary scanning
//! - `package`: zip package I/O with atomic in-place replacement
//! - `pdf_branding`: PDF document-information metadata
//! - `gift_report`: self-contained HTML appraisal report
//! - `sanitize`: risky unicode glyph cleanup for PDF generation scripts
//!
//! Binaries:
//! - `toc-placeholders`: fill the TOC of a DOCX in place
//! - `pdf-brand`: brand one or more PDFs
//! - `gift-report`: render the HTML report
//! - `sanitize-code`: sanitize a source file in place

pub mod error;
pub mod gift_report;
pub mod package;
pub mod pdf_branding;
pub mod sanitize;
pub mod toc_field;
pub mod toc_placeholders;
pub mod toc_styles;

pub use error::{Result, ToolkitError};
