mod settings;

pub use settings::{
    AnalysisSettings, DatabaseSettings, LoggingSettings, QueueSettings, ServerSettings, Settings,
    StagingSettings,
};
