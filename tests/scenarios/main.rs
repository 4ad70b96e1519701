//! Scenario-based tests for codepipeline-synth

mod helpers;

mod config_files;
mod cross_account;
mod ordering;
