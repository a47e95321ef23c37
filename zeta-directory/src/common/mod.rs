//! 共通型（エラー型）

pub mod error;
