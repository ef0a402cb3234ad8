/// Unit tests for the public domain and calendar API
mod calendar_tests;
mod domain_tests;
