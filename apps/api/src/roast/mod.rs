// Resume roasting: prompt construction, the pluggable roaster backend,
// the upload-to-roast pipeline and its HTTP handler.
// All model calls go through llm_client.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod roaster;
