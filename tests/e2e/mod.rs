// End-to-end tests for the texttape pipeline
//
// Every test drives the public API against scripted in-process synthesis
// clients, so no network access or credentials are needed. Files are written
// to per-test temporary directories.

mod helpers;
mod test_config;
mod test_segmentation;
mod test_storage;
