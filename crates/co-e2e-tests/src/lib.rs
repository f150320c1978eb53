//! Test-only crate. The scenarios live in `tests/`.
