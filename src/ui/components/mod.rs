pub mod dialog;
pub mod dropdown;
pub mod footer;
pub mod header;
pub mod toast;
