//! Test suites for the figure stage daemon.

mod support;
mod unit;
