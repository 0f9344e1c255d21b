pub mod propertydtos;
pub mod userdtos;
pub mod viewingdtos;
