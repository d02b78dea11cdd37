//! Scenario tests for the recommendation models and engine

mod engine_scenarios_test;
