pub mod request;
pub mod request_item;
pub mod response;
pub mod suggestion;
pub mod tab;
pub mod ui;
