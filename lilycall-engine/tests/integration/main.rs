mod media_tests;
mod negotiation_tests;
mod utils;
