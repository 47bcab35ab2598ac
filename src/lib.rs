pub mod commands;
pub mod completions;
pub mod fragment;
pub mod git;
pub mod metadata;
pub mod modrinth;
pub mod output;
pub mod pack;
pub mod packwiz;
pub mod sync;
