pub mod braindump;
pub mod dag;
pub mod dagman;
pub mod dax;
pub mod embedded_xml;
pub mod kickstart;
pub mod meta;
pub mod submit;
mod xml_ext;

pub use xml_ext::NodeExt;
