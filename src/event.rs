use crate::completion::CompletionError;

#[derive(Debug, Clone)]
pub enum AppEvent {
    CompletionFinished {
        generation: u64,
        result: Result<String, CompletionError>,
    },
}
