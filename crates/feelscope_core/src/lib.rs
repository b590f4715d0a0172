pub mod domain;
pub mod extract;
pub mod normalize;
pub mod ports;
pub mod report;

pub use domain::{Classification, ClassificationRecord, Emotion, NewRecord, UNKNOWN_LABEL};
pub use extract::{extract_object, reassemble_stream, ExtractionError};
pub use normalize::{classify_model_output, keyword_heuristic, polarity_classification};
pub use ports::{
    ContentFeedService, DatabaseService, PolarityScorer, PortError, PortResult, PromptStyle,
    SentimentModelService,
};
pub use report::{chart_data, to_csv, ChartData, LabelCount};
