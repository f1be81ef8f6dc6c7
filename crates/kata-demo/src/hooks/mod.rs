pub mod async_stop;
pub mod marketplace;
pub mod pre_read;
