//! CLI command implementations.
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `run`     | `Run`            |
//! | `status`  | `Status`         |
//! | `phrases` | `Phrases`        |
//! | `config`  | `Config`         |

pub mod config;
pub mod phrases;
pub mod run;
pub mod status;

pub use config::cmd_config;
pub use phrases::cmd_phrases;
pub use run::cmd_run;
pub use status::cmd_status;
