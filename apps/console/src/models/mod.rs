pub mod record;
pub mod remark;

pub use record::{Record, RecordKind};
pub use remark::{Author, Remark, RemarkStatus};
