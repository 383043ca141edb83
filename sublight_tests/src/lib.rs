/*! Scenario tests for the sublight crates.

The [`stepper`] module is the shared harness: a body registry made of plain
structs, a manual clock and a frame driver, so every scenario runs the real
per-frame code path with frame-exact time.
*/

pub mod stepper;

#[cfg(test)]
mod scenarios;
