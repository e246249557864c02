pub mod category;
pub mod clothing;
pub mod maintenance;
pub mod outfit;
pub mod purchase;
pub mod wear;
