pub mod error;
mod receipts;
mod templates;

pub use self::{
    error::Error,
    receipts::{PgReceiptsRepo, ReceiptsRepo},
    templates::{PgTemplateStore, TemplateRow, TemplateStore},
};
