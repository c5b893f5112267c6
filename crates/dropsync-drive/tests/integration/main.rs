//! Integration tests for dropsync-drive
//!
//! Uses wiremock to simulate the Google Drive v3 API and verifies
//! end-to-end behavior of folder lookup, folder creation, multipart
//! and resumable uploads, and error classification.

mod common;

mod test_folders;
mod test_uploads;
mod test_errors;
mod test_store;
