// Résumé analysis: PDF text extraction, rubric selection, prompt composition,
// and the POST /analyze handler that ties them to the model client.

pub mod extractor;
pub mod handlers;
pub mod prompts;
pub mod rubric;
