//! Scenario tests over the whole object model.

mod archive;
mod scene;
mod universe;
