pub mod convert;
pub mod dispatch;
pub mod sync;
