//! Presentation layer - state and view-models behind the forms
//!
//! No widgets here: the edit session, the list rows and the save form are
//! plain values that a front end (the CLI, or a desktop shell) renders.

pub mod form;
pub mod session;
pub mod views;

pub use form::{DossierForm, LineItemForm, ValidatedDossier};
pub use session::{EditSession, Mode, Transition};
pub use views::{
    DossierListEntry, InvoiceRow, InvoiceStatusFilter, LineItemRow, QuoteRow, QuoteStatusFilter,
};
