pub mod cdata;
pub mod javascript;
pub mod xml;
