//! Quote and invoice generation
//!
//! Builders turn a dossier snapshot into a [`model::Document`], `docx`
//! serialises it, `save` puts the bytes where the operator asked.

pub mod docx;
pub mod format;
pub mod invoice;
pub mod layout;
pub mod model;
pub mod quote;
pub mod save;

pub use docx::render_docx;
pub use invoice::{InvoiceKind, build_invoice};
pub use layout::{DossierSnapshot, RenderContext};
pub use model::Document;
pub use quote::{build_quote, quote_file_name};
pub use save::{DirectoryPrompt, ExportOutcome, FixedPath, SaveLocationPrompt};
