pub mod catalog;
pub mod charts;
pub mod controller;
pub mod journal;
pub mod logging;
pub mod photo;
pub mod storage;
pub mod web_client;
