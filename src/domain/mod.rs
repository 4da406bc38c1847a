pub mod book;
pub mod category;
pub mod common;
pub mod expense;
pub mod settings;

pub use book::{Book, CURRENT_SCHEMA_VERSION};
pub use category::{Category, TrackingMode, DEFAULT_COLOR, DEFAULT_ICON};
pub use common::{Displayable, Identifiable, NamedEntity};
pub use expense::Expense;
pub use settings::{ReportFrequency, ReportSettings};
