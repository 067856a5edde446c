mod catalog;
mod ids;
mod option;

pub use catalog::{Catalog, CatalogError, Question, QuestionRecord, Section};
pub use ids::{ParseIdError, QuestionId, SectionId};
pub use option::{OptionLetter, OptionLetterError};
