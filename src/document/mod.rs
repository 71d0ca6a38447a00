pub mod agenda;
pub mod canonical;
pub mod draft;
pub mod export;
pub mod form;
pub mod preview;

pub use agenda::{AgendaEdit, line_break, line_break_insertion};
pub use canonical::{PayloadDigest, canonical_text};
pub use draft::{Draft, SaveError, SaveStep, SignError, SignRequest, ViewMode};
pub use export::{DocumentExporter, ExportError, ExportedFile, PdfExporter, export_filename};
pub use form::{AssemblyRequest, Field, FieldUpdate, FormError};
pub use preview::Preview;
