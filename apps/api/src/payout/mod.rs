// Payout: stake multiplier, scenario matrix, and the history and market inputs
// derived from the plan store.
pub mod calculator;
pub mod handlers;
pub mod history;
pub mod scenarios;
