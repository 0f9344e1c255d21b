pub mod propertymodel;
pub mod usermodel;
pub mod viewingmodel;
