// Plan synthesis: gap analysis → pacing tier → week-by-week schedule → overview.
// Pure scheduling lives in `synthesizer`; `generator` wires it to the store,
// the curator and the text provider.

pub mod export;
pub mod gap_analysis;
pub mod generator;
pub mod handlers;
pub mod overview;
pub mod pacing;
pub mod prompts;
pub mod synthesizer;
