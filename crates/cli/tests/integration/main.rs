mod common;
mod shell_tests;
mod unuse_tests;
