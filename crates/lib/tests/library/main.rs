mod package_tests;
mod session_tests;
