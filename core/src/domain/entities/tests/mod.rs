mod client_tests;
mod token_tests;
