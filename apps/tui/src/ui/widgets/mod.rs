pub mod charts;
pub mod map;
pub mod popup;
pub mod radar;
pub mod tables;
pub mod thermometer;
