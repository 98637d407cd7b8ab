pub mod invoice;
pub mod report;
pub mod training;

pub use invoice::{
    required_columns, InvoiceField, InvoiceRecord, LineItem, DOCUMENT_PLACEHOLDER,
    PRODUCT_NAME_COLUMN, PRODUCT_TOTAL_COLUMN, QUANTITY_COLUMN, SUMMARY_PLACEHOLDER,
    UNIT_PRICE_COLUMN,
};
pub use report::{PipelineReport, RenderFailure, RenderReport, RenderedDocument, RunOutcome};
pub use training::{ModelDescriptor, TrainingPair};
