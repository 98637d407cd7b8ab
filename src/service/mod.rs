pub mod aggregator;
pub mod model_stub;
pub mod pipeline;
pub mod preprocessor;
pub mod renderer;
pub mod serializer;

pub use aggregator::{aggregate_rows, RecordAggregator};
pub use model_stub::simulate_training;
pub use pipeline::PipelineService;
pub use preprocessor::Preprocessor;
pub use renderer::DocumentRenderer;
pub use serializer::{to_training_pair, to_training_pairs, SummaryStyle};
