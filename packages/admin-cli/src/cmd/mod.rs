pub mod accounts;
pub mod groups;
pub mod logs;
pub mod selection;
pub mod send;
