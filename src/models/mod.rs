//! 数据模型模块

pub mod interaction;
pub mod profile;
pub mod recall;

pub use interaction::{Interaction, StoreOutcome, is_trivial};
pub use profile::UserProfile;
pub use recall::{RecallOutcome, RecallSource, RecalledMemory};
